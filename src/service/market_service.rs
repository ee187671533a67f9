//! Market service: registers snapshots, answers deposit-form edits and
//! reviews deposits before submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::market_entry::{MarketEntry, MarketSummary};
use crate::domain::{EventBus, MarketEvent, MarketId, MarketRegistry};
use crate::error::GatewayError;
use crate::market::math::mul_div_floor;
use crate::market::{
    Amount, InputField, InputPair, LiquidityAddition, Market, PairState, QuoteError,
    derive_state, lp_preview, parse_pair, sy_equivalent,
};

/// Basis-point denominator for slippage.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Outcome of one edit of the add-liquidity form.
#[derive(Debug, Clone)]
pub struct InputQuote {
    /// Snapshot version the quote was computed against.
    pub version: u64,
    /// New field values.
    pub pair: InputPair,
    /// Pair classification after the edit.
    pub state: PairState,
    /// Parsed deposit-token amount.
    pub token_amount: Option<Amount>,
    /// Parsed PT amount.
    pub pt_amount: Option<Amount>,
    /// Pool-share preview, or the reason it could not be computed.
    pub lp_preview: Result<Amount, QuoteError>,
}

impl InputQuote {
    /// Whether the form may proceed to review.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.token_amount.is_some()
            && self.pt_amount.is_some()
            && self.lp_preview.as_ref().is_ok_and(|lp| !lp.is_zero())
    }
}

/// Confirmed deposit, ready for submission.
#[derive(Debug, Clone)]
pub struct AddLiquidityReview {
    /// Market identifier.
    pub market_id: MarketId,
    /// Snapshot version the review was computed against.
    pub version: u64,
    /// Deposit-token amount.
    pub token_amount: Amount,
    /// PT amount.
    pub pt_amount: Amount,
    /// SY equivalent of the deposit-token amount.
    pub sy_amount: Amount,
    /// Pool-share mint breakdown.
    pub addition: LiquidityAddition,
    /// Slippage tolerance applied.
    pub slippage_bps: u32,
    /// Lowest pool-share amount the submission should accept.
    pub min_lp_out: Amount,
}

/// Orchestration layer for market operations.
///
/// Holds the [`MarketRegistry`] for state and the [`EventBus`] for event
/// emission. Quote methods clone the snapshot `Arc` and never hold a
/// registry lock while running market math.
#[derive(Debug, Clone)]
pub struct MarketService {
    registry: Arc<MarketRegistry>,
    event_bus: EventBus,
    default_slippage_bps: u32,
}

impl MarketService {
    /// Creates a new `MarketService`.
    #[must_use]
    pub fn new(registry: Arc<MarketRegistry>, event_bus: EventBus, default_slippage_bps: u32) -> Self {
        Self {
            registry,
            event_bus,
            default_slippage_bps,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`MarketRegistry`].
    #[must_use]
    pub const fn registry(&self) -> &Arc<MarketRegistry> {
        &self.registry
    }

    /// Slippage applied when a review request omits one.
    #[must_use]
    pub const fn default_slippage_bps(&self) -> u32 {
        self.default_slippage_bps
    }

    /// Registers a market snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the registry rejects the entry.
    pub async fn register_market(&self, market: Market) -> Result<MarketId, GatewayError> {
        let market_id = MarketId::new();
        let event = MarketEvent::MarketRegistered {
            market_id,
            pt_symbol: market.pt().symbol().to_string(),
            sy_symbol: market.sy().token().symbol().to_string(),
            expiry: market.expiry(),
            timestamp: Utc::now(),
        };
        self.registry
            .insert(MarketEntry::new(market_id, market))
            .await?;
        let _ = self.event_bus.publish(event);

        tracing::info!(%market_id, "market registered");
        Ok(market_id)
    }

    /// Replaces a market's snapshot and returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID, or
    /// [`GatewayError::InvalidRequest`] if the snapshot's PT, SY or LP token
    /// differs from the registered one.
    pub async fn refresh_market(
        &self,
        market_id: MarketId,
        market: Market,
    ) -> Result<u64, GatewayError> {
        let state = *market.state();
        let version = self
            .registry
            .replace(market_id, market, ensure_same_tokens)
            .await?;

        let _ = self.event_bus.publish(MarketEvent::MarketRefreshed {
            market_id,
            version,
            total_pt: state.total_pt.to_string(),
            total_sy: state.total_sy.to_string(),
            total_lp: state.total_lp.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%market_id, version, "market refreshed");
        Ok(version)
    }

    /// Removes a market.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn remove_market(&self, market_id: MarketId) -> Result<(), GatewayError> {
        let _summary = self.registry.remove(market_id).await?;

        let _ = self.event_bus.publish(MarketEvent::MarketRemoved {
            market_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%market_id, "market removed");
        Ok(())
    }

    /// Summaries of all registered markets.
    pub async fn list_markets(&self) -> Vec<MarketSummary> {
        self.registry.list().await
    }

    /// Current snapshot and version of a market.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn snapshot(&self, market_id: MarketId) -> Result<(Arc<Market>, u64), GatewayError> {
        self.registry.snapshot(market_id).await
    }

    /// Applies one form edit and computes the resulting pool-share preview.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID, or
    /// [`GatewayError::Quote`] if the counterpart cannot be derived. A
    /// failed preview is reported inside the [`InputQuote`].
    pub async fn edit_input(
        &self,
        market_id: MarketId,
        current: &InputPair,
        field: InputField,
        raw_input: &str,
    ) -> Result<InputQuote, GatewayError> {
        let (market, version) = self.snapshot(market_id).await?;
        let derived = derive_state(&market, current, field, raw_input)?;
        let quote = quote_pair(&market, version, derived.pair, derived.state);

        tracing::debug!(%market_id, ?field, state = ?quote.state, "input edited");
        Ok(quote)
    }

    /// Re-evaluates a pair against the current snapshot without editing it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MarketNotFound`] for an unknown ID.
    pub async fn requote(
        &self,
        market_id: MarketId,
        pair: InputPair,
        state: PairState,
    ) -> Result<InputQuote, GatewayError> {
        let (market, version) = self.snapshot(market_id).await?;
        Ok(quote_pair(&market, version, pair, state))
    }

    /// Validates a filled form and returns the deposit to submit.
    ///
    /// `slippage_bps` falls back to the configured default.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MarketNotFound`] for an unknown ID.
    /// - [`GatewayError::IncompleteDeposit`] if either amount is absent.
    /// - [`GatewayError::MarketExpired`] if the PT has matured at `now`.
    /// - [`GatewayError::InvalidRequest`] if slippage exceeds 10 000 bps.
    /// - [`GatewayError::Quote`] if the liquidity formula fails.
    pub async fn review_add_liquidity(
        &self,
        market_id: MarketId,
        pair: &InputPair,
        slippage_bps: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<AddLiquidityReview, GatewayError> {
        let (market, version) = self.snapshot(market_id).await?;

        let parsed = parse_pair(&market, pair);
        let token_amount = parsed
            .token
            .ok_or(GatewayError::IncompleteDeposit("deposit token"))?;
        let pt_amount = parsed.pt.ok_or(GatewayError::IncompleteDeposit("PT"))?;

        if market.is_expired(now) {
            return Err(GatewayError::MarketExpired(*market_id.as_uuid()));
        }

        let slippage_bps = slippage_bps.unwrap_or(self.default_slippage_bps);
        if slippage_bps > BPS_DENOMINATOR {
            return Err(GatewayError::InvalidRequest(format!(
                "slippage must be at most {BPS_DENOMINATOR} bps, got {slippage_bps}"
            )));
        }

        let sy_amount = sy_equivalent(&market, &token_amount)?;
        let addition = market.add_liquidity_preview(&sy_amount, &pt_amount)?;
        let min_lp_raw = mul_div_floor(
            addition.lp_to_account.raw(),
            u128::from(BPS_DENOMINATOR - slippage_bps),
            u128::from(BPS_DENOMINATOR),
        )
        .ok_or(QuoteError::ArithmeticOverflow)?;
        let min_lp_out = Amount::from_raw(market.lp_token().clone(), min_lp_raw);

        tracing::info!(
            %market_id,
            version,
            lp = %addition.lp_to_account,
            slippage_bps,
            "add-liquidity reviewed"
        );

        Ok(AddLiquidityReview {
            market_id,
            version,
            token_amount,
            pt_amount,
            sy_amount,
            addition,
            slippage_bps,
            min_lp_out,
        })
    }
}

/// Parses `pair` against `market` and computes its pool-share preview.
#[must_use]
pub fn quote_pair(market: &Market, version: u64, pair: InputPair, state: PairState) -> InputQuote {
    let parsed = parse_pair(market, &pair);
    let lp_preview = lp_preview(market, parsed.token.as_ref(), parsed.pt.as_ref());
    InputQuote {
        version,
        pair,
        state,
        token_amount: parsed.token,
        pt_amount: parsed.pt,
        lp_preview,
    }
}

/// A refresh may move reserves and rates, never the market's tokens.
fn ensure_same_tokens(current: &Market, next: &Market) -> Result<(), GatewayError> {
    let same = current.lp_token() == next.lp_token()
        && current.pt() == next.pt()
        && current.sy().token() == next.sy().token()
        && current.sy().yield_token() == next.sy().yield_token();
    if same {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(
            "refreshed snapshot must keep the market's PT, SY, deposit and LP tokens".to_string(),
        ))
    }
}
