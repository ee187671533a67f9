//! Service layer: business logic orchestration.
//!
//! [`MarketService`] owns market registration and refresh, runs the
//! dual-input engine against registry snapshots, and emits events through
//! the [`super::domain::EventBus`].

pub mod market_service;

pub use market_service::{AddLiquidityReview, InputQuote, MarketService, quote_pair};
