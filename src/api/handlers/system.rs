//! System endpoints: health check and engine constants.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::LP_DISPLAY_DIGITS;
use crate::app_state::AppState;
use crate::market::MINIMUM_LIQUIDITY;
use crate::market::math::ONE;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    markets: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, registered market count and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let markets = state.market_service.registry().len().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            markets,
        }),
    )
}

/// Constants the add-liquidity form works with.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddLiquidityConfig {
    minimum_liquidity: String,
    fixed_point_one: String,
    lp_display_digits: usize,
    default_slippage_bps: u32,
}

/// `GET /config/add-liquidity` — Engine constants.
#[utoipa::path(
    get,
    path = "/config/add-liquidity",
    tag = "System",
    summary = "Add-liquidity constants",
    description = "Returns the pool-share units locked by a first deposit, the 1e18 fixed-point scale, the preview display precision and the default slippage.",
    responses(
        (status = 200, description = "Engine constants", body = AddLiquidityConfig),
    )
)]
pub async fn add_liquidity_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(AddLiquidityConfig {
        minimum_liquidity: MINIMUM_LIQUIDITY.to_string(),
        fixed_point_one: ONE.to_string(),
        lp_display_digits: LP_DISPLAY_DIGITS,
        default_slippage_bps: state.market_service.default_slippage_bps(),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/add-liquidity", get(add_liquidity_config_handler))
}
