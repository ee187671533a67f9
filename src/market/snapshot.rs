//! Read-only market snapshot: SY wrapper, yield index, reserves and the
//! liquidity-minted formula.
//!
//! A [`Market`] pairs a principal token (PT) against a yield-bearing
//! wrapper (SY). Snapshots are validated once on construction and never
//! mutated afterwards; a refreshed market is a new snapshot.

use chrono::{DateTime, Utc};

use super::amount::{Amount, Token};
use super::error::QuoteError;
use super::math::{ONE, mul_div_ceil, mul_div_floor, sqrt_of_product};
use super::price::Price;

/// Pool-share units locked forever by the first deposit.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// Converts a yield-token (asset) raw amount into SY units at `index`.
#[must_use]
pub fn asset_to_sy(index: u128, asset_raw: u128) -> Option<u128> {
    mul_div_floor(asset_raw, ONE, index)
}

/// Converts an SY raw amount into yield-token (asset) units at `index`.
#[must_use]
pub fn sy_to_asset(index: u128, sy_raw: u128) -> Option<u128> {
    mul_div_floor(sy_raw, index, ONE)
}

/// Standardized yield wrapper around a single yield-bearing token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyToken {
    token: Token,
    yield_token: Token,
    exchange_rate: u128,
}

impl SyToken {
    /// Creates an SY wrapper. `exchange_rate` is yield-token units per SY
    /// unit, scaled by `1e18`.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidMarket`] for a zero exchange rate.
    pub fn new(token: Token, yield_token: Token, exchange_rate: u128) -> Result<Self, QuoteError> {
        if exchange_rate == 0 {
            return Err(QuoteError::InvalidMarket(
                "SY exchange rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            token,
            yield_token,
            exchange_rate,
        })
    }

    /// The SY token itself.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// The wrapped yield-bearing token users deposit.
    #[must_use]
    pub const fn yield_token(&self) -> &Token {
        &self.yield_token
    }

    /// Yield-token units per SY unit, scaled by `1e18`.
    #[must_use]
    pub const fn exchange_rate(&self) -> u128 {
        self.exchange_rate
    }

    /// SY that depositing `amount` of the yield token would mint.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnsupportedToken`] if `amount` is not the
    /// yield token, or [`QuoteError::ArithmeticOverflow`].
    pub fn preview_deposit(&self, amount: &Amount) -> Result<Amount, QuoteError> {
        if amount.token() != &self.yield_token {
            return Err(QuoteError::UnsupportedToken(amount.token().symbol().to_string()));
        }
        let raw = mul_div_floor(amount.raw(), ONE, self.exchange_rate)
            .ok_or(QuoteError::ArithmeticOverflow)?;
        Ok(Amount::from_raw(self.token.clone(), raw))
    }

    /// Amount of `token_out` that redeeming `sy_amount` would return.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnsupportedToken`] for any `token_out` other
    /// than the yield token, [`QuoteError::TokenMismatch`] if `sy_amount`
    /// is not SY, or [`QuoteError::ArithmeticOverflow`].
    pub fn preview_redeem(&self, token_out: &Token, sy_amount: &Amount) -> Result<Amount, QuoteError> {
        if token_out != &self.yield_token {
            return Err(QuoteError::UnsupportedToken(token_out.symbol().to_string()));
        }
        self.token.ensure_is(sy_amount.token())?;
        let raw = mul_div_floor(sy_amount.raw(), self.exchange_rate, ONE)
            .ok_or(QuoteError::ArithmeticOverflow)?;
        Ok(Amount::from_raw(self.yield_token.clone(), raw))
    }
}

/// Yield token of the PT/YT split, carrying the current yield index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldToken {
    token: Token,
    py_index_current: u128,
}

impl YieldToken {
    /// Creates a YT with its current index (scaled by `1e18`).
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidMarket`] for a zero index.
    pub fn new(token: Token, py_index_current: u128) -> Result<Self, QuoteError> {
        if py_index_current == 0 {
            return Err(QuoteError::InvalidMarket(
                "yield index must be positive".to_string(),
            ));
        }
        Ok(Self {
            token,
            py_index_current,
        })
    }

    /// The YT token.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Current PY index, scaled by `1e18`. Non-decreasing over time.
    #[must_use]
    pub const fn py_index_current(&self) -> u128 {
        self.py_index_current
    }
}

/// Pool reserves and pool-share supply in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketState {
    /// PT held by the pool.
    pub total_pt: u128,
    /// SY held by the pool.
    pub total_sy: u128,
    /// Pool-share tokens in circulation.
    pub total_lp: u128,
}

/// Outcome of a two-sided deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAddition {
    /// Pool-share tokens credited to the depositor.
    pub lp_to_account: Amount,
    /// Pool-share tokens locked in the pool (first deposit only).
    pub lp_to_reserve: Amount,
    /// SY actually taken by the pool.
    pub sy_used: Amount,
    /// PT actually taken by the pool.
    pub pt_used: Amount,
}

/// Immutable snapshot of a PT/SY market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    lp_token: Token,
    sy: SyToken,
    pt: Token,
    yt: YieldToken,
    state: MarketState,
    expiry: DateTime<Utc>,
}

impl Market {
    /// Validates and builds a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidMarket`] when the LP, SY and PT tokens
    /// are not pairwise distinct, or when the pool has pool-share supply
    /// but an empty reserve.
    pub fn new(
        lp_token: Token,
        sy: SyToken,
        pt: Token,
        yt: YieldToken,
        state: MarketState,
        expiry: DateTime<Utc>,
    ) -> Result<Self, QuoteError> {
        if lp_token == pt || lp_token == sy.token || pt == sy.token {
            return Err(QuoteError::InvalidMarket(
                "LP, SY and PT tokens must be distinct".to_string(),
            ));
        }
        if state.total_lp > 0 && (state.total_pt == 0 || state.total_sy == 0) {
            return Err(QuoteError::InvalidMarket(
                "pool with LP supply must hold both PT and SY".to_string(),
            ));
        }
        Ok(Self {
            lp_token,
            sy,
            pt,
            yt,
            state,
            expiry,
        })
    }

    /// The market's own pool-share token.
    #[must_use]
    pub const fn lp_token(&self) -> &Token {
        &self.lp_token
    }

    /// The SY side of the pool.
    #[must_use]
    pub const fn sy(&self) -> &SyToken {
        &self.sy
    }

    /// The PT side of the pool.
    #[must_use]
    pub const fn pt(&self) -> &Token {
        &self.pt
    }

    /// The YT carrying the yield index.
    #[must_use]
    pub const fn yt(&self) -> &YieldToken {
        &self.yt
    }

    /// Reserves and pool-share supply.
    #[must_use]
    pub const fn state(&self) -> &MarketState {
        &self.state
    }

    /// Maturity of the PT.
    #[must_use]
    pub const fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Whether the market has matured at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    /// Whether no liquidity has been provided yet.
    #[must_use]
    pub const fn is_bootstrap(&self) -> bool {
        self.state.total_lp == 0
    }

    /// Exchange rate of `token` against the other side of the pool.
    ///
    /// `price_of(SY)` converts SY into PT, `price_of(PT)` converts PT into
    /// SY.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnsupportedToken`] for tokens outside the pair
    /// and [`QuoteError::NoExchangeRate`] when a reserve is empty.
    pub fn price_of(&self, token: &Token) -> Result<Price, QuoteError> {
        let sy_price = || {
            Price::from_reserves(
                self.sy.token.clone(),
                self.pt.clone(),
                self.state.total_sy,
                self.state.total_pt,
            )
        };
        if token == &self.sy.token {
            sy_price()
        } else if token == &self.pt {
            Ok(sy_price()?.invert())
        } else {
            Err(QuoteError::UnsupportedToken(token.symbol().to_string()))
        }
    }

    /// Pool-share tokens a deposit of `sy` and `pt` would mint for the
    /// depositor.
    ///
    /// # Errors
    ///
    /// See [`Market::add_liquidity_preview`].
    pub fn get_liquidity_minted(&self, sy: &Amount, pt: &Amount) -> Result<Amount, QuoteError> {
        self.add_liquidity_preview(sy, pt).map(|add| add.lp_to_account)
    }

    /// Full breakdown of a two-sided deposit.
    ///
    /// The first deposit mints `sqrt(asset(sy) × pt)` and locks
    /// [`MINIMUM_LIQUIDITY`] of it. Later deposits mint in proportion to
    /// the scarcer side; the surplus of the other side is left unused.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::TokenMismatch`] for amounts outside this
    /// market, [`QuoteError::InsufficientInitialLiquidity`] when a first
    /// deposit is too small, [`QuoteError::ZeroLiquidityMinted`] when the
    /// deposit mints nothing, or [`QuoteError::ArithmeticOverflow`].
    pub fn add_liquidity_preview(
        &self,
        sy: &Amount,
        pt: &Amount,
    ) -> Result<LiquidityAddition, QuoteError> {
        self.sy.token.ensure_is(sy.token())?;
        self.pt.ensure_is(pt.token())?;

        let (lp_to_account, lp_to_reserve, sy_used, pt_used) = if self.is_bootstrap() {
            let asset = sy_to_asset(self.yt.py_index_current, sy.raw())
                .ok_or(QuoteError::ArithmeticOverflow)?;
            let lp = sqrt_of_product(asset, pt.raw());
            if lp <= MINIMUM_LIQUIDITY {
                return Err(QuoteError::InsufficientInitialLiquidity {
                    minimum: MINIMUM_LIQUIDITY,
                });
            }
            (lp - MINIMUM_LIQUIDITY, MINIMUM_LIQUIDITY, sy.raw(), pt.raw())
        } else {
            let MarketState {
                total_pt,
                total_sy,
                total_lp,
            } = self.state;
            let by_pt =
                mul_div_floor(pt.raw(), total_lp, total_pt).ok_or(QuoteError::ArithmeticOverflow)?;
            let by_sy =
                mul_div_floor(sy.raw(), total_lp, total_sy).ok_or(QuoteError::ArithmeticOverflow)?;
            if by_pt <= by_sy {
                let sy_used = mul_div_ceil(total_sy, by_pt, total_lp)
                    .ok_or(QuoteError::ArithmeticOverflow)?;
                (by_pt, 0, sy_used.min(sy.raw()), pt.raw())
            } else {
                let pt_used = mul_div_ceil(total_pt, by_sy, total_lp)
                    .ok_or(QuoteError::ArithmeticOverflow)?;
                (by_sy, 0, sy.raw(), pt_used.min(pt.raw()))
            }
        };

        if lp_to_account == 0 {
            return Err(QuoteError::ZeroLiquidityMinted);
        }

        Ok(LiquidityAddition {
            lp_to_account: Amount::from_raw(self.lp_token.clone(), lp_to_account),
            lp_to_reserve: Amount::from_raw(self.lp_token.clone(), lp_to_reserve),
            sy_used: Amount::from_raw(self.sy.token.clone(), sy_used),
            pt_used: Amount::from_raw(self.pt.clone(), pt_used),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn token(symbol: &str, decimals: u8) -> Token {
        let Ok(token) = Token::new(format!("0x{}", symbol.to_lowercase()), symbol, decimals) else {
            panic!("valid token");
        };
        token
    }

    /// Market with 18-decimal tokens, SY rate 1:1 and PY index 1.
    pub(crate) fn make_market(state: MarketState) -> Market {
        make_market_with(state, ONE, ONE)
    }

    /// Market with 18-decimal tokens and the given SY exchange rate and PY
    /// index.
    pub(crate) fn make_market_with(state: MarketState, exchange_rate: u128, py_index: u128) -> Market {
        let Ok(sy) = SyToken::new(token("SY-stETH", 18), token("wstETH", 18), exchange_rate) else {
            panic!("valid SY");
        };
        let Ok(yt) = YieldToken::new(token("YT-stETH", 18), py_index) else {
            panic!("valid YT");
        };
        let expiry = Utc::now() + chrono::Duration::days(90);
        let Ok(market) = Market::new(token("LP-stETH", 18), sy, token("PT-stETH", 18), yt, state, expiry)
        else {
            panic!("valid market");
        };
        market
    }

    fn steady_state() -> MarketState {
        MarketState {
            total_pt: 1_050_000 * ONE,
            total_sy: 1_000_000 * ONE,
            total_lp: 1_000_000 * ONE,
        }
    }

    #[test]
    fn rejects_duplicate_tokens() {
        let Ok(sy) = SyToken::new(token("SY", 18), token("Y", 18), ONE) else {
            panic!("valid SY");
        };
        let Ok(yt) = YieldToken::new(token("YT", 18), ONE) else {
            panic!("valid YT");
        };
        let result = Market::new(
            token("PT", 18),
            sy,
            token("PT", 18),
            yt,
            MarketState::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(QuoteError::InvalidMarket(_))));
    }

    #[test]
    fn rejects_supply_without_reserves() {
        let Ok(sy) = SyToken::new(token("SY", 18), token("Y", 18), ONE) else {
            panic!("valid SY");
        };
        let Ok(yt) = YieldToken::new(token("YT", 18), ONE) else {
            panic!("valid YT");
        };
        let state = MarketState {
            total_pt: 0,
            total_sy: 10,
            total_lp: 10,
        };
        let result = Market::new(token("LP", 18), sy, token("PT", 18), yt, state, Utc::now());
        assert!(matches!(result, Err(QuoteError::InvalidMarket(_))));
    }

    #[test]
    fn zero_rate_and_index_are_rejected() {
        assert!(SyToken::new(token("SY", 18), token("Y", 18), 0).is_err());
        assert!(YieldToken::new(token("YT", 18), 0).is_err());
    }

    #[test]
    fn preview_deposit_and_redeem_apply_rate() {
        // 1 SY = 1.25 yield token
        let Ok(sy) = SyToken::new(token("SY", 18), token("Y", 18), ONE + ONE / 4) else {
            panic!("valid SY");
        };
        let Ok(minted) = sy.preview_deposit(&Amount::from_raw(token("Y", 18), 5 * ONE)) else {
            panic!("deposit preview failed");
        };
        assert_eq!(minted.raw(), 4 * ONE);
        let Ok(redeemed) = sy.preview_redeem(&token("Y", 18), &minted) else {
            panic!("redeem preview failed");
        };
        assert_eq!(redeemed.raw(), 5 * ONE);
    }

    #[test]
    fn preview_rejects_foreign_tokens() {
        let Ok(sy) = SyToken::new(token("SY", 18), token("Y", 18), ONE) else {
            panic!("valid SY");
        };
        let deposit = sy.preview_deposit(&Amount::from_raw(token("Z", 18), 1));
        assert!(matches!(deposit, Err(QuoteError::UnsupportedToken(_))));
        let redeem = sy.preview_redeem(&token("Y", 18), &Amount::from_raw(token("Z", 18), 1));
        assert!(matches!(redeem, Err(QuoteError::TokenMismatch { .. })));
    }

    #[test]
    fn yield_index_conversions() {
        let index = 2 * ONE;
        assert_eq!(asset_to_sy(index, 10), Some(5));
        assert_eq!(sy_to_asset(index, 5), Some(10));
        assert_eq!(asset_to_sy(0, 10), None);
    }

    #[test]
    fn price_of_both_directions() {
        let market = make_market(steady_state());
        let Ok(sy_price) = market.price_of(market.sy().token()) else {
            panic!("SY price");
        };
        assert_eq!(sy_price.quote_token(), market.pt());
        let Ok(pt_price) = market.price_of(market.pt()) else {
            panic!("PT price");
        };
        assert_eq!(pt_price.quote_token(), market.sy().token());
        assert!(matches!(
            market.price_of(market.lp_token()),
            Err(QuoteError::UnsupportedToken(_))
        ));
    }

    #[test]
    fn bootstrap_market_has_no_price() {
        let market = make_market(MarketState::default());
        assert!(market.is_bootstrap());
        assert_eq!(
            market.price_of(market.pt()),
            Err(QuoteError::NoExchangeRate)
        );
    }

    #[test]
    fn bootstrap_mint_locks_minimum_liquidity() {
        let market = make_market(MarketState::default());
        let sy = Amount::from_raw(market.sy().token().clone(), 4 * ONE);
        let pt = Amount::from_raw(market.pt().clone(), 9 * ONE);
        let Ok(add) = market.add_liquidity_preview(&sy, &pt) else {
            panic!("bootstrap mint failed");
        };
        // sqrt(4e18 * 9e18) = 6e18
        assert_eq!(add.lp_to_account.raw(), 6 * ONE - MINIMUM_LIQUIDITY);
        assert_eq!(add.lp_to_reserve.raw(), MINIMUM_LIQUIDITY);
        assert_eq!(add.sy_used, sy);
        assert_eq!(add.pt_used, pt);
    }

    #[test]
    fn bootstrap_mint_too_small() {
        let market = make_market(MarketState::default());
        let sy = Amount::from_raw(market.sy().token().clone(), 1_000);
        let pt = Amount::from_raw(market.pt().clone(), 1_000);
        assert_eq!(
            market.get_liquidity_minted(&sy, &pt),
            Err(QuoteError::InsufficientInitialLiquidity {
                minimum: MINIMUM_LIQUIDITY
            })
        );
    }

    #[test]
    fn steady_state_mints_by_scarcer_side() {
        let market = make_market(steady_state());
        let sy = Amount::from_raw(market.sy().token().clone(), 10 * ONE);
        // More PT than the ratio needs: SY limits the mint.
        let pt = Amount::from_raw(market.pt().clone(), 20 * ONE);
        let Ok(add) = market.add_liquidity_preview(&sy, &pt) else {
            panic!("mint failed");
        };
        assert_eq!(add.lp_to_account.raw(), 10 * ONE);
        assert_eq!(add.lp_to_reserve.raw(), 0);
        assert_eq!(add.sy_used.raw(), 10 * ONE);
        assert_eq!(add.pt_used.raw(), 10_500_000_000_000_000_000);
    }

    #[test]
    fn steady_state_pt_limited() {
        let market = make_market(steady_state());
        let sy = Amount::from_raw(market.sy().token().clone(), 100 * ONE);
        let pt = Amount::from_raw(market.pt().clone(), 21 * ONE);
        let Ok(add) = market.add_liquidity_preview(&sy, &pt) else {
            panic!("mint failed");
        };
        // 21 PT / 1.05 = 20 LP, which needs 20 SY
        assert_eq!(add.lp_to_account.raw(), 20 * ONE);
        assert_eq!(add.sy_used.raw(), 20 * ONE);
        assert_eq!(add.pt_used.raw(), 21 * ONE);
    }

    #[test]
    fn dust_deposit_mints_nothing() {
        let market = make_market(MarketState {
            total_pt: 1_000 * ONE,
            total_sy: 1_000 * ONE,
            total_lp: 1,
        });
        let sy = Amount::from_raw(market.sy().token().clone(), 1);
        let pt = Amount::from_raw(market.pt().clone(), 1);
        assert_eq!(
            market.get_liquidity_minted(&sy, &pt),
            Err(QuoteError::ZeroLiquidityMinted)
        );
    }

    #[test]
    fn mint_rejects_swapped_sides() {
        let market = make_market(steady_state());
        let sy = Amount::from_raw(market.sy().token().clone(), ONE);
        let pt = Amount::from_raw(market.pt().clone(), ONE);
        assert!(matches!(
            market.get_liquidity_minted(&pt, &sy),
            Err(QuoteError::TokenMismatch { .. })
        ));
    }

    #[test]
    fn expiry_is_inclusive() {
        let market = make_market(steady_state());
        assert!(!market.is_expired(Utc::now()));
        assert!(market.is_expired(market.expiry()));
    }
}
