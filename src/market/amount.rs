//! Tokens and fixed-point token amounts.
//!
//! An [`Amount`] is a raw `u128` count of a token's smallest unit. Text
//! conversion is exact in both directions: [`Amount::try_parse`] reads a
//! user-typed decimal string and [`Amount::to_exact`] renders the canonical
//! decimal form.

use std::fmt;

use super::error::QuoteError;

/// Largest precision whose scale (`10^decimals`) fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

/// An asset with a fixed decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    address: String,
    symbol: String,
    decimals: u8,
}

impl Token {
    /// Creates a token.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidDecimals`] when `decimals` exceeds
    /// [`MAX_DECIMALS`].
    pub fn new(
        address: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Result<Self, QuoteError> {
        if decimals > MAX_DECIMALS {
            return Err(QuoteError::InvalidDecimals(decimals));
        }
        Ok(Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        })
    }

    /// Contract address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Display symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal precision.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// `10^decimals`.
    #[must_use]
    pub const fn scale(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }

    pub(crate) fn ensure_is(&self, actual: &Self) -> Result<(), QuoteError> {
        if self == actual {
            Ok(())
        } else {
            Err(QuoteError::TokenMismatch {
                expected: self.symbol.clone(),
                actual: actual.symbol.clone(),
            })
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// A quantity of a [`Token`] in raw units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    token: Token,
    raw: u128,
}

impl Amount {
    /// Wraps a raw unit count.
    #[must_use]
    pub const fn from_raw(token: Token, raw: u128) -> Self {
        Self { token, raw }
    }

    /// The zero amount of `token`.
    #[must_use]
    pub const fn zero(token: Token) -> Self {
        Self { token, raw: 0 }
    }

    /// Parses user-typed decimal text for `token`.
    ///
    /// Returns `None` for empty text, anything that is not plain ASCII
    /// digits with at most one `.`, more fractional digits than the token
    /// carries, values beyond `u128`, and values equal to zero.
    #[must_use]
    pub fn try_parse(input: &str, token: &Token) -> Option<Self> {
        let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) || !is_digits(fraction) {
            return None;
        }
        let decimals = usize::from(token.decimals);
        if fraction.len() > decimals {
            return None;
        }

        let whole_raw = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().ok()?.checked_mul(token.scale())?
        };
        let fraction_raw = if fraction.is_empty() {
            0
        } else {
            let padding = u32::try_from(decimals - fraction.len()).ok()?;
            fraction
                .parse::<u128>()
                .ok()?
                .checked_mul(10u128.checked_pow(padding)?)?
        };
        let raw = whole_raw.checked_add(fraction_raw)?;
        (raw != 0).then(|| Self::from_raw(token.clone(), raw))
    }

    /// The token this amount is denominated in.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Raw unit count.
    #[must_use]
    pub const fn raw(&self) -> u128 {
        self.raw
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Canonical decimal text: no trailing fractional zeros, no `.` for
    /// whole values.
    #[must_use]
    pub fn to_exact(&self) -> String {
        format_units(&self.raw.to_string(), self.token.decimals)
    }

    /// Decimal text rounded half-up to `digits` significant digits
    /// (at least one).
    #[must_use]
    pub fn to_significant(&self, digits: usize) -> String {
        significant(self.raw, self.token.decimals, digits)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.token.symbol)
    }
}

/// Places the decimal point `decimals` digits from the right of a raw digit
/// string and strips trailing fractional zeros.
pub(crate) fn format_units(digits: &str, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits.to_string();
    }
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Rounds a raw value half-up to `digits` significant digits and renders it
/// with [`format_units`].
pub(crate) fn significant(raw: u128, decimals: u8, digits: usize) -> String {
    if raw == 0 {
        return "0".to_string();
    }
    let digits = digits.max(1);
    let text = raw.to_string();
    if text.len() <= digits {
        return format_units(&text, decimals);
    }

    let (head, tail) = text.split_at(digits);
    let round_up = tail.bytes().next().is_some_and(|b| b >= b'5');
    let mut kept: Vec<u8> = head.bytes().collect();
    if round_up {
        let mut carry = true;
        for byte in kept.iter_mut().rev() {
            if *byte == b'9' {
                *byte = b'0';
            } else {
                *byte += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }
    let mut rounded = String::from_utf8_lossy(&kept).into_owned();
    rounded.push_str(&"0".repeat(tail.len()));
    format_units(&rounded, decimals)
}
