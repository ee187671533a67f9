//! Market DTOs for register, refresh, get and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{PaginationMeta, TokenDto, parse_raw};
use crate::domain::{MarketId, MarketSummary};
use crate::error::GatewayError;
use crate::market::{Market, MarketState, SyToken, YieldToken};

/// SY wrapper metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyDto {
    /// The SY token.
    pub token: TokenDto,
    /// The yield-bearing token it wraps.
    pub yield_token: TokenDto,
    /// Yield-token units per SY unit scaled by 1e18 (string-encoded).
    pub exchange_rate: String,
}

/// YT metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct YtDto {
    /// The YT token.
    pub token: TokenDto,
    /// Current PY index scaled by 1e18 (string-encoded).
    pub py_index_current: String,
}

/// Pool reserves and supply (string-encoded raw units).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketStateDto {
    /// PT reserve.
    pub total_pt: String,
    /// SY reserve.
    pub total_sy: String,
    /// Pool-share supply.
    pub total_lp: String,
}

/// Full market snapshot. Request body for `POST /markets` and
/// `PUT /markets/:id`, and the entry format of the seed file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketSnapshotDto {
    /// Pool-share token.
    pub lp_token: TokenDto,
    /// SY side.
    pub sy: SyDto,
    /// PT side.
    pub pt: TokenDto,
    /// YT carrying the yield index.
    pub yt: YtDto,
    /// Reserves and supply.
    pub state: MarketStateDto,
    /// PT maturity.
    pub expiry: DateTime<Utc>,
}

impl MarketSnapshotDto {
    /// Validates the snapshot into a [`Market`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for malformed numbers and
    /// [`GatewayError::Quote`] when the snapshot violates a market
    /// invariant.
    pub fn to_market(&self) -> Result<Market, GatewayError> {
        let sy = SyToken::new(
            self.sy.token.to_token()?,
            self.sy.yield_token.to_token()?,
            parse_raw("sy.exchange_rate", &self.sy.exchange_rate)?,
        )?;
        let yt = YieldToken::new(
            self.yt.token.to_token()?,
            parse_raw("yt.py_index_current", &self.yt.py_index_current)?,
        )?;
        let state = MarketState {
            total_pt: parse_raw("state.total_pt", &self.state.total_pt)?,
            total_sy: parse_raw("state.total_sy", &self.state.total_sy)?,
            total_lp: parse_raw("state.total_lp", &self.state.total_lp)?,
        };
        Ok(Market::new(
            self.lp_token.to_token()?,
            sy,
            self.pt.to_token()?,
            yt,
            state,
            self.expiry,
        )?)
    }
}

impl From<&Market> for MarketSnapshotDto {
    fn from(market: &Market) -> Self {
        let state = market.state();
        Self {
            lp_token: market.lp_token().into(),
            sy: SyDto {
                token: market.sy().token().into(),
                yield_token: market.sy().yield_token().into(),
                exchange_rate: market.sy().exchange_rate().to_string(),
            },
            pt: market.pt().into(),
            yt: YtDto {
                token: market.yt().token().into(),
                py_index_current: market.yt().py_index_current().to_string(),
            },
            state: MarketStateDto {
                total_pt: state.total_pt.to_string(),
                total_sy: state.total_sy.to_string(),
                total_lp: state.total_lp.to_string(),
            },
            expiry: market.expiry(),
        }
    }
}

/// Response body for `POST /markets` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterMarketResponse {
    /// Assigned market identifier.
    pub market_id: MarketId,
    /// Initial snapshot version (always 1).
    pub version: u64,
    /// Server registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Response body for `PUT /markets/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshMarketResponse {
    /// Market identifier.
    pub market_id: MarketId,
    /// Snapshot version after the refresh.
    pub version: u64,
    /// Refresh timestamp.
    pub refreshed_at: DateTime<Utc>,
}

/// Single market detail for `GET /markets/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarketDetailResponse {
    /// Market identifier.
    pub market_id: MarketId,
    /// Snapshot version.
    pub version: u64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last refresh timestamp.
    pub refreshed_at: DateTime<Utc>,
    /// Current snapshot.
    pub snapshot: MarketSnapshotDto,
    /// Whole PT per whole SY at the current reserves; absent before the
    /// first deposit.
    pub pt_per_sy: Option<String>,
    /// Whether the market has no pool-share supply yet.
    pub is_bootstrap: bool,
    /// Whether the PT has matured.
    pub is_expired: bool,
}

/// Market summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarketSummaryDto {
    /// Market identifier.
    pub market_id: MarketId,
    /// PT symbol.
    pub pt_symbol: String,
    /// SY symbol.
    pub sy_symbol: String,
    /// Pool-share token symbol.
    pub lp_symbol: String,
    /// PT maturity.
    pub expiry: DateTime<Utc>,
    /// Snapshot version.
    pub version: u64,
    /// Whether the market has no pool-share supply yet.
    pub is_bootstrap: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<MarketSummary> for MarketSummaryDto {
    fn from(summary: MarketSummary) -> Self {
        let market = &summary.market;
        Self {
            market_id: summary.market_id,
            pt_symbol: market.pt().symbol().to_string(),
            sy_symbol: market.sy().token().symbol().to_string(),
            lp_symbol: market.lp_token().symbol().to_string(),
            expiry: market.expiry(),
            version: summary.version,
            is_bootstrap: market.is_bootstrap(),
            created_at: summary.created_at,
        }
    }
}

/// Paginated list response for `GET /markets`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarketListResponse {
    /// Market summaries.
    pub data: Vec<MarketSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
