//! Exchange rate between two tokens of a market.

use super::amount::{Amount, Token, significant};
use super::error::QuoteError;
use super::math::mul_div_floor;

/// Fractional digits used when rendering a price for display.
const DISPLAY_PRECISION: u8 = 18;

/// Raw `quote` units per raw `base` unit, held as an exact ratio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    base: Token,
    quote: Token,
    numerator: u128,
    denominator: u128,
}

impl Price {
    /// Builds the price of `base` from the two pool reserves: one raw unit
    /// of `base` is worth `quote_reserve / base_reserve` raw `quote` units.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NoExchangeRate`] when either reserve is zero.
    pub fn from_reserves(
        base: Token,
        quote: Token,
        base_reserve: u128,
        quote_reserve: u128,
    ) -> Result<Self, QuoteError> {
        if base_reserve == 0 || quote_reserve == 0 {
            return Err(QuoteError::NoExchangeRate);
        }
        Ok(Self {
            base,
            quote,
            numerator: quote_reserve,
            denominator: base_reserve,
        })
    }

    /// Token being priced.
    #[must_use]
    pub const fn base(&self) -> &Token {
        &self.base
    }

    /// Token the price is expressed in.
    #[must_use]
    pub const fn quote_token(&self) -> &Token {
        &self.quote
    }

    /// Converts an amount of `base` into `quote`, rounding down.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::TokenMismatch`] if `amount` is not
    /// denominated in `base`, or [`QuoteError::ArithmeticOverflow`].
    pub fn quote(&self, amount: &Amount) -> Result<Amount, QuoteError> {
        self.base.ensure_is(amount.token())?;
        let raw = mul_div_floor(amount.raw(), self.numerator, self.denominator)
            .ok_or(QuoteError::ArithmeticOverflow)?;
        Ok(Amount::from_raw(self.quote.clone(), raw))
    }

    /// The reverse rate (`quote` priced in `base`).
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            numerator: self.denominator,
            denominator: self.numerator,
        }
    }

    /// Human-readable price (whole `quote` per whole `base`), rounded to
    /// `digits` significant digits. `None` if the decimal adjustment
    /// overflows.
    #[must_use]
    pub fn to_significant(&self, digits: usize) -> Option<String> {
        // value = numerator / denominator × 10^(base.decimals − quote.decimals)
        let exponent = i32::from(DISPLAY_PRECISION) + i32::from(self.base.decimals())
            - i32::from(self.quote.decimals());
        let scaled = if exponent >= 0 {
            let factor = 10u128.checked_pow(exponent.unsigned_abs())?;
            mul_div_floor(self.numerator, factor, self.denominator)?
        } else {
            let factor = 10u128.checked_pow(exponent.unsigned_abs())?;
            mul_div_floor(self.numerator, 1, self.denominator.checked_mul(factor)?)?
        };
        Some(significant(scaled, DISPLAY_PRECISION, digits))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn token(symbol: &str, decimals: u8) -> Token {
        let Ok(token) = Token::new(format!("0x{symbol}"), symbol, decimals) else {
            panic!("valid token");
        };
        token
    }

    #[test]
    fn zero_reserve_has_no_rate() {
        let result = Price::from_reserves(token("SY", 18), token("PT", 18), 0, 10);
        assert_eq!(result, Err(QuoteError::NoExchangeRate));
    }

    #[test]
    fn quote_applies_ratio_and_floors() {
        let Ok(price) = Price::from_reserves(token("SY", 0), token("PT", 0), 100, 105) else {
            panic!("valid price");
        };
        let Ok(out) = price.quote(&Amount::from_raw(token("SY", 0), 10)) else {
            panic!("quote failed");
        };
        // 10 * 1.05 = 10.5, floored
        assert_eq!(out.raw(), 10);
        assert_eq!(out.token().symbol(), "PT");
    }

    #[test]
    fn quote_rejects_foreign_token() {
        let Ok(price) = Price::from_reserves(token("SY", 18), token("PT", 18), 1, 1) else {
            panic!("valid price");
        };
        let result = price.quote(&Amount::from_raw(token("PT", 18), 1));
        assert!(matches!(result, Err(QuoteError::TokenMismatch { .. })));
    }

    #[test]
    fn invert_swaps_direction() {
        let Ok(price) = Price::from_reserves(token("SY", 0), token("PT", 0), 100, 200) else {
            panic!("valid price");
        };
        let inverse = price.invert();
        assert_eq!(inverse.base().symbol(), "PT");
        let Ok(out) = inverse.quote(&Amount::from_raw(token("PT", 0), 50)) else {
            panic!("quote failed");
        };
        assert_eq!(out.raw(), 25);
    }

    #[test]
    fn display_adjusts_for_decimals() {
        let Ok(same) = Price::from_reserves(token("SY", 18), token("PT", 18), 1_000_000, 1_050_000)
        else {
            panic!("valid price");
        };
        assert_eq!(same.to_significant(6).as_deref(), Some("1.05"));

        // 1 whole base (6 decimals) = 2 whole quote (18 decimals)
        let Ok(mixed) = Price::from_reserves(
            token("USD", 6),
            token("ETH", 18),
            1_000_000,
            2_000_000_000_000_000_000,
        ) else {
            panic!("valid price");
        };
        assert_eq!(mixed.to_significant(6).as_deref(), Some("2"));
    }
}
