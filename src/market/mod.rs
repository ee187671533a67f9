//! Market math and the dual-input quote engine.
//!
//! Everything in this module is synchronous and free of I/O. A [`Market`]
//! snapshot is the only input besides user text; the gateway layers above
//! decide where snapshots come from and when they are replaced.

pub mod amount;
pub mod dual_input;
pub mod error;
pub mod math;
pub mod price;
pub mod snapshot;

pub use amount::{Amount, Token};
pub use dual_input::{
    DerivedPair, DualInput, InputField, InputPair, PairState, ParsedPair, derive_state,
    lp_preview, parse_pair, sy_equivalent,
};
pub use error::QuoteError;
pub use price::Price;
pub use snapshot::{LiquidityAddition, MINIMUM_LIQUIDITY, Market, MarketState, SyToken, YieldToken};
