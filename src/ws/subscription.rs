//! Per-connection subscription manager.
//!
//! Tracks which market IDs a WebSocket client is subscribed to and
//! filters broadcast events server-side.

use std::collections::HashSet;

use crate::domain::MarketId;

/// Manages the set of market subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed market IDs. Ignored while `subscribe_all` is set.
    market_ids: HashSet<MarketId>,
    /// Whether the client subscribed to all markets (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds market IDs to the subscription set; `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, ids: &[MarketId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.market_ids.extend(ids.iter().copied());
    }

    /// Removes market IDs from the subscription set; `wildcard` clears `"*"`.
    pub fn unsubscribe(&mut self, ids: &[MarketId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.market_ids.remove(id);
        }
    }

    /// Returns `true` if the given market ID passes the filter.
    #[must_use]
    pub fn matches(&self, market_id: MarketId) -> bool {
        self.subscribe_all || self.market_ids.contains(&market_id)
    }

    /// Returns the number of explicitly subscribed market IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.market_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

/// Splits raw subscription targets into market IDs, the wildcard flag and
/// the entries that are neither.
#[must_use]
pub fn parse_targets(raw: &[String]) -> (Vec<MarketId>, bool, Vec<String>) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for target in raw {
        if target == "*" {
            wildcard = true;
        } else if let Ok(uuid) = target.parse::<uuid::Uuid>() {
            ids.push(MarketId::from_uuid(uuid));
        } else {
            rejected.push(target.clone());
        }
    }
    (ids, wildcard, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(MarketId::new()));
    }

    #[test]
    fn subscribe_and_unsubscribe_specific_market() {
        let mut mgr = SubscriptionManager::new();
        let id = MarketId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(MarketId::new()));
        assert_eq!(mgr.count(), 1);

        mgr.unsubscribe(&[id], false);
        assert!(!mgr.matches(id));
    }

    #[test]
    fn wildcard_toggles() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.is_subscribed_all());
        assert!(mgr.matches(MarketId::new()));
        mgr.unsubscribe(&[], true);
        assert!(!mgr.matches(MarketId::new()));
    }

    #[test]
    fn parse_targets_sorts_entries() {
        let id = MarketId::new();
        let raw = vec!["*".to_string(), id.to_string(), "nope".to_string()];
        let (ids, wildcard, rejected) = parse_targets(&raw);
        assert_eq!(ids, vec![id]);
        assert!(wildcard);
        assert_eq!(rejected, vec!["nope".to_string()]);
    }
}
