//! Concurrent market storage with per-market locking.
//!
//! [`MarketRegistry`] keeps every registered market in a `HashMap` whose
//! entries are individually guarded by a [`tokio::sync::RwLock`]. Readers
//! clone the snapshot `Arc` and release the lock before running any math.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::MarketId;
use super::market_entry::{MarketEntry, MarketSummary};
use crate::error::GatewayError;
use crate::market::Market;

/// Central store for registered markets.
///
/// # Concurrency
///
/// - Snapshot reads on the same market run concurrently.
/// - Refreshes of different markets run concurrently.
/// - Refreshes of the same market are serialized.
#[derive(Debug)]
pub struct MarketRegistry {
    markets: RwLock<HashMap<MarketId, Arc<RwLock<MarketEntry>>>>,
}

impl MarketRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            markets: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the ID is already taken.
    pub async fn insert(&self, entry: MarketEntry) -> Result<MarketId, GatewayError> {
        let market_id = entry.market_id;
        let mut map = self.markets.write().await;
        if map.contains_key(&market_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "market {market_id} already exists"
            )));
        }
        map.insert(market_id, Arc::new(RwLock::new(entry)));
        Ok(market_id)
    }

    /// Returns the entry behind its per-market lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn get(&self, market_id: MarketId) -> Result<Arc<RwLock<MarketEntry>>, GatewayError> {
        let map = self.markets.read().await;
        map.get(&market_id)
            .cloned()
            .ok_or(GatewayError::MarketNotFound(*market_id.as_uuid()))
    }

    /// Returns the current snapshot and its version.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn snapshot(&self, market_id: MarketId) -> Result<(Arc<Market>, u64), GatewayError> {
        let entry_lock = self.get(market_id).await?;
        let entry = entry_lock.read().await;
        Ok((Arc::clone(&entry.market), entry.version))
    }

    /// Swaps in a new snapshot after `check` accepts it against the current
    /// one. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID, or the
    /// error produced by `check`.
    pub async fn replace<F>(
        &self,
        market_id: MarketId,
        market: Market,
        check: F,
    ) -> Result<u64, GatewayError>
    where
        F: FnOnce(&Market, &Market) -> Result<(), GatewayError>,
    {
        let entry_lock = self.get(market_id).await?;
        let mut entry = entry_lock.write().await;
        check(&entry.market, &market)?;
        Ok(entry.replace(market))
    }

    /// Removes a market, returning its last entry state as a summary.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn remove(&self, market_id: MarketId) -> Result<MarketSummary, GatewayError> {
        let entry_lock = self
            .markets
            .write()
            .await
            .remove(&market_id)
            .ok_or(GatewayError::MarketNotFound(*market_id.as_uuid()))?;
        let entry = entry_lock.read().await;
        Ok(MarketSummary::from(&*entry))
    }

    /// Summaries of all markets, oldest registration first.
    pub async fn list(&self) -> Vec<MarketSummary> {
        let map = self.markets.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(MarketSummary::from(&*entry));
        }
        summaries.sort_by_key(|s| (s.created_at, *s.market_id.as_uuid()));
        summaries
    }

    /// Number of registered markets.
    pub async fn len(&self) -> usize {
        self.markets.read().await.len()
    }

    /// Returns `true` if no market is registered.
    pub async fn is_empty(&self) -> bool {
        self.markets.read().await.is_empty()
    }
}

impl Default for MarketRegistry {
    fn default() -> Self {
        Self::new()
    }
}
