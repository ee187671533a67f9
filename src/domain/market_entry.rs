//! Registered market snapshot with gateway metadata.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::MarketId;
use crate::market::Market;

/// A market snapshot as held by the registry.
///
/// The snapshot itself is immutable and shared; a refresh swaps in a new
/// `Arc` and bumps `version`.
#[derive(Debug)]
pub struct MarketEntry {
    /// Market identifier (immutable after registration).
    pub market_id: MarketId,

    /// Current snapshot.
    pub market: Arc<Market>,

    /// Snapshot version, starting at 1 and incremented on every refresh.
    pub version: u64,

    /// Registration timestamp.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last snapshot replacement.
    pub refreshed_at: DateTime<Utc>,
}

impl MarketEntry {
    /// Creates an entry at version 1.
    #[must_use]
    pub fn new(market_id: MarketId, market: Market) -> Self {
        let now = Utc::now();
        Self {
            market_id,
            market: Arc::new(market),
            version: 1,
            created_at: now,
            refreshed_at: now,
        }
    }

    /// Replaces the snapshot and returns the new version.
    pub fn replace(&mut self, market: Market) -> u64 {
        self.market = Arc::new(market);
        self.version += 1;
        self.refreshed_at = Utc::now();
        self.version
    }
}

/// Lightweight summary of a market for list endpoints.
#[derive(Debug, Clone)]
pub struct MarketSummary {
    /// Market identifier.
    pub market_id: MarketId,
    /// Current snapshot.
    pub market: Arc<Market>,
    /// Snapshot version.
    pub version: u64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&MarketEntry> for MarketSummary {
    fn from(entry: &MarketEntry) -> Self {
        Self {
            market_id: entry.market_id,
            market: Arc::clone(&entry.market),
            version: entry.version,
            created_at: entry.created_at,
        }
    }
}
