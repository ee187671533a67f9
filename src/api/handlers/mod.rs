//! REST endpoint handlers organized by resource.

pub mod add_liquidity;
pub mod market;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(market::routes())
        .merge(add_liquidity::routes())
}
