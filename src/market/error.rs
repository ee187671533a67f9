//! Errors raised by market math and the dual-input quote engine.
//!
//! Text that fails to parse is never an error here: parsing yields an
//! absent amount instead. These variants cover snapshot inconsistencies
//! and liquidity-formula failures, which callers must surface.

/// Failure of a market-math computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// Token precision outside the supported `0..=38` range.
    #[error("unsupported token precision: {0} decimals")]
    InvalidDecimals(u8),

    /// An amount was denominated in a different token than required.
    #[error("token mismatch: expected {expected}, got {actual}")]
    TokenMismatch {
        /// Symbol of the token the operation requires.
        expected: String,
        /// Symbol of the token that was supplied.
        actual: String,
    },

    /// The token is not part of this market or cannot be wrapped.
    #[error("token {0} is not supported by this market")]
    UnsupportedToken(String),

    /// A reserve used for the exchange rate is zero.
    #[error("market has no exchange rate: empty reserves")]
    NoExchangeRate,

    /// The snapshot violates a market invariant.
    #[error("invalid market snapshot: {0}")]
    InvalidMarket(String),

    /// A conversion overflowed the 128-bit amount range.
    #[error("arithmetic overflow in market math")]
    ArithmeticOverflow,

    /// First deposit does not clear the locked minimum liquidity.
    #[error("initial liquidity must exceed {minimum} pool-share units")]
    InsufficientInitialLiquidity {
        /// Pool-share units permanently locked on the first deposit.
        minimum: u128,
    },

    /// The deposit would mint no pool-share tokens.
    #[error("deposit mints zero liquidity")]
    ZeroLiquidityMinted,
}
