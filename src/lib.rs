//! # yield-market-gateway
//!
//! REST API and WebSocket gateway quoting two-sided liquidity deposits for
//! PT/SY yield-tokenization markets.
//!
//! A deposit form holds two fields, the SY's yield-bearing token and the
//! principal token (PT). Editing one field derives the other from the
//! pool's reserve ratio and the SY exchange rate, and the pair is priced
//! into a pool-share (LP) preview. Markets without pool-share supply have
//! no rate yet, so their fields are edited independently and the first
//! deposit mints the geometric mean of both sides.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler + per-connection forms (ws/)
//!     │
//!     ├── MarketService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── MarketRegistry (domain/)
//!     └── Market math + dual-input engine (market/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod market;
pub mod seed;
pub mod service;
pub mod ws;
