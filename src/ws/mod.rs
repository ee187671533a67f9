//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` carries market event subscriptions and a
//! per-connection add-liquidity form for each market the client edits.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
