//! Domain events reflecting market registry changes.
//!
//! Every registry mutation emits a [`MarketEvent`] through the
//! [`super::EventBus`]. WebSocket connections forward them to subscribers
//! and re-derive open deposit previews on refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::MarketId;

/// Domain event emitted after every registry mutation.
///
/// Raw amounts are string-encoded to preserve `u128` precision in JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A market snapshot was registered.
    MarketRegistered {
        /// Market identifier.
        market_id: MarketId,
        /// PT symbol.
        pt_symbol: String,
        /// SY symbol.
        sy_symbol: String,
        /// PT maturity.
        expiry: DateTime<Utc>,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A market snapshot was replaced.
    MarketRefreshed {
        /// Market identifier.
        market_id: MarketId,
        /// Version after the refresh.
        version: u64,
        /// PT reserve (raw units).
        total_pt: String,
        /// SY reserve (raw units).
        total_sy: String,
        /// Pool-share supply (raw units).
        total_lp: String,
        /// Refresh timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A market was removed.
    MarketRemoved {
        /// Market identifier.
        market_id: MarketId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Returns the market ID associated with this event.
    #[must_use]
    pub const fn market_id(&self) -> MarketId {
        match self {
            Self::MarketRegistered { market_id, .. }
            | Self::MarketRefreshed { market_id, .. }
            | Self::MarketRemoved { market_id, .. } => *market_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::MarketRegistered { .. } => "market_registered",
            Self::MarketRefreshed { .. } => "market_refreshed",
            Self::MarketRemoved { .. } => "market_removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refreshed_event_serializes_with_tag() {
        let id = MarketId::new();
        let event = MarketEvent::MarketRefreshed {
            market_id: id,
            version: 3,
            total_pt: "1050".to_string(),
            total_sy: "1000".to_string(),
            total_lp: "1000".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "market_refreshed");
        assert_eq!(event.market_id(), id);
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["event_type"], "market_refreshed");
        assert_eq!(json["version"], 3);
        assert_eq!(json["total_pt"], "1050");
    }

    #[test]
    fn removed_event_type() {
        let event = MarketEvent::MarketRemoved {
            market_id: MarketId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "market_removed");
    }
}
