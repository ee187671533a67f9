//! Startup loading of market snapshots from a JSON file.
//!
//! The file holds an array of [`MarketSnapshotDto`] objects, the same shape
//! `POST /api/v1/markets` accepts.

use std::path::Path;

use crate::api::dto::MarketSnapshotDto;
use crate::domain::MarketId;
use crate::error::GatewayError;
use crate::service::MarketService;

/// Failure to load the seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("cannot read seed file {path}: {source}")]
    Io {
        /// Seed file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a JSON array of market snapshots.
    #[error("malformed seed file {path}: {source}")]
    Json {
        /// Seed file path.
        path: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// An entry was rejected.
    #[error("seed entry {index} rejected: {source}")]
    Entry {
        /// Zero-based position in the array.
        index: usize,
        /// Why the entry was rejected.
        source: GatewayError,
    },
}

/// Parses seed file contents.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when `contents` is not an array of
/// snapshots.
pub fn parse_seed(contents: &str) -> Result<Vec<MarketSnapshotDto>, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Registers every snapshot in the file at `path`. All entries are
/// validated before any is registered.
///
/// # Errors
///
/// Returns a [`SeedError`] if the file cannot be read or parsed, or if any
/// entry is not a valid market.
pub async fn load_seed(path: &Path, service: &MarketService) -> Result<Vec<MarketId>, SeedError> {
    let shown = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: shown.clone(),
            source,
        })?;
    let entries = parse_seed(&contents).map_err(|source| SeedError::Json {
        path: shown.clone(),
        source,
    })?;

    let markets = entries
        .iter()
        .enumerate()
        .map(|(index, dto)| {
            dto.to_market()
                .map_err(|source| SeedError::Entry { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut ids = Vec::with_capacity(markets.len());
    for (index, market) in markets.into_iter().enumerate() {
        let id = service
            .register_market(market)
            .await
            .map_err(|source| SeedError::Entry { index, source })?;
        ids.push(id);
    }
    tracing::info!(path = %shown, count = ids.len(), "seed markets loaded");
    Ok(ids)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{EventBus, MarketRegistry};
    use crate::market::MarketState;
    use crate::market::snapshot::tests::make_market;

    fn service() -> MarketService {
        MarketService::new(Arc::new(MarketRegistry::new()), EventBus::new(8), 50)
    }

    #[tokio::test]
    async fn loads_snapshots_from_file() {
        let dto = MarketSnapshotDto::from(&make_market(MarketState::default()));
        let Ok(json) = serde_json::to_string(&vec![dto.clone(), dto]) else {
            panic!("serializable");
        };
        let path = std::env::temp_dir().join(format!("seed-{}.json", uuid::Uuid::new_v4()));
        let Ok(()) = tokio::fs::write(&path, json).await else {
            panic!("write failed");
        };

        let svc = service();
        let result = load_seed(&path, &svc).await;
        let _ = tokio::fs::remove_file(&path).await;
        let Ok(ids) = result else {
            panic!("seed load failed");
        };
        assert_eq!(ids.len(), 2);
        assert_eq!(svc.list_markets().await.len(), 2);
    }

    #[tokio::test]
    async fn invalid_entry_registers_nothing() {
        let good = MarketSnapshotDto::from(&make_market(MarketState::default()));
        let mut bad = good.clone();
        bad.state.total_lp = "5".to_string();
        let Ok(json) = serde_json::to_string(&vec![good, bad]) else {
            panic!("serializable");
        };
        let path = std::env::temp_dir().join(format!("seed-{}.json", uuid::Uuid::new_v4()));
        let Ok(()) = tokio::fs::write(&path, json).await else {
            panic!("write failed");
        };

        let svc = service();
        let result = load_seed(&path, &svc).await;
        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(result, Err(SeedError::Entry { index: 1, .. })));
        assert!(svc.list_markets().await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let svc = service();
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_seed(&path, &svc).await,
            Err(SeedError::Io { .. })
        ));
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(parse_seed("{}").is_err());
        assert_eq!(parse_seed("[]").map(|v| v.len()).ok(), Some(0));
    }
}
