//! Data Transfer Objects for REST and WebSocket payloads.
//!
//! All raw amounts are serialized as JSON strings to prevent precision
//! loss on u128 values.

pub mod add_liquidity_dto;
pub mod common_dto;
pub mod market_dto;

pub use add_liquidity_dto::*;
pub use common_dto::*;
pub use market_dto::*;
