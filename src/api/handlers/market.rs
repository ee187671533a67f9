//! Market CRUD handlers: register, list, get, refresh, delete.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    MarketDetailResponse, MarketListResponse, MarketSnapshotDto, MarketSummaryDto,
    PaginationMeta, PaginationParams, RefreshMarketResponse, RegisterMarketResponse,
};
use crate::app_state::AppState;
use crate::domain::MarketId;
use crate::error::{ErrorResponse, GatewayError};

/// Fractional digits of the PT-per-SY price in market details.
const PRICE_DISPLAY_DIGITS: usize = 6;

/// `POST /markets` — Register a market snapshot.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed numbers or an inconsistent snapshot.
#[utoipa::path(
    post,
    path = "/api/v1/markets",
    tag = "Markets",
    summary = "Register a market",
    description = "Registers a PT/SY market snapshot (tokens, SY rate, PY index, reserves, expiry) and assigns it an ID.",
    request_body = MarketSnapshotDto,
    responses(
        (status = 201, description = "Market registered", body = RegisterMarketResponse),
        (status = 400, description = "Malformed snapshot", body = ErrorResponse),
        (status = 422, description = "Snapshot violates a market invariant", body = ErrorResponse),
    )
)]
pub async fn register_market(
    State(state): State<AppState>,
    Json(req): Json<MarketSnapshotDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let market = req.to_market()?;
    let market_id = state.market_service.register_market(market).await?;

    let response = RegisterMarketResponse {
        market_id,
        version: 1,
        created_at: Utc::now(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /markets` — List markets with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/markets",
    tag = "Markets",
    summary = "List markets",
    description = "Returns a paginated list of registered markets, oldest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated market list", body = MarketListResponse),
    )
)]
pub async fn list_markets(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let summaries = state.market_service.list_markets().await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = total.div_ceil(per_page);

    let start = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
    let data: Vec<MarketSummaryDto> = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(MarketSummaryDto::from)
        .collect();

    Ok(Json(MarketListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /markets/:id` — Get market details.
///
/// # Errors
///
/// Returns [`GatewayError::MarketNotFound`] if the market does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/markets/{id}",
    tag = "Markets",
    summary = "Get market details",
    description = "Returns the current snapshot, its version and the PT-per-SY pool price.",
    params(
        ("id" = uuid::Uuid, Path, description = "Market UUID"),
    ),
    responses(
        (status = 200, description = "Market details", body = MarketDetailResponse),
        (status = 404, description = "Market not found", body = ErrorResponse),
    )
)]
pub async fn get_market(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let market_id = MarketId::from_uuid(id);
    let entry_lock = state.market_service.registry().get(market_id).await?;
    let (market, version, created_at, refreshed_at) = {
        let entry = entry_lock.read().await;
        (
            Arc::clone(&entry.market),
            entry.version,
            entry.created_at,
            entry.refreshed_at,
        )
    };

    let pt_per_sy = market
        .price_of(market.sy().token())
        .ok()
        .and_then(|price| price.to_significant(PRICE_DISPLAY_DIGITS));

    Ok(Json(MarketDetailResponse {
        market_id,
        version,
        created_at,
        refreshed_at,
        snapshot: MarketSnapshotDto::from(&*market),
        pt_per_sy,
        is_bootstrap: market.is_bootstrap(),
        is_expired: market.is_expired(Utc::now()),
    }))
}

/// `PUT /markets/:id` — Replace a market's snapshot.
///
/// # Errors
///
/// Returns [`GatewayError`] if the market does not exist, the snapshot is
/// malformed, or its tokens differ from the registered market.
#[utoipa::path(
    put,
    path = "/api/v1/markets/{id}",
    tag = "Markets",
    summary = "Refresh a market",
    description = "Replaces the snapshot (reserves, SY rate, PY index, expiry), bumps the version and emits a MarketRefreshed event. Tokens must not change.",
    params(
        ("id" = uuid::Uuid, Path, description = "Market UUID"),
    ),
    request_body = MarketSnapshotDto,
    responses(
        (status = 200, description = "Market refreshed", body = RefreshMarketResponse),
        (status = 400, description = "Malformed snapshot or token change", body = ErrorResponse),
        (status = 404, description = "Market not found", body = ErrorResponse),
    )
)]
pub async fn refresh_market(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<MarketSnapshotDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let market_id = MarketId::from_uuid(id);
    let market = req.to_market()?;
    let version = state
        .market_service
        .refresh_market(market_id, market)
        .await?;

    Ok(Json(RefreshMarketResponse {
        market_id,
        version,
        refreshed_at: Utc::now(),
    }))
}

/// `DELETE /markets/:id` — Remove a market.
///
/// # Errors
///
/// Returns [`GatewayError::MarketNotFound`] if the market does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/markets/{id}",
    tag = "Markets",
    summary = "Delete a market",
    description = "Removes a market and emits a MarketRemoved event.",
    params(
        ("id" = uuid::Uuid, Path, description = "Market UUID"),
    ),
    responses(
        (status = 204, description = "Market deleted"),
        (status = 404, description = "Market not found", body = ErrorResponse),
    )
)]
pub async fn delete_market(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let market_id = MarketId::from_uuid(id);
    state.market_service.remove_market(market_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Market management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/markets", post(register_market).get(list_markets))
        .route(
            "/markets/{id}",
            get(get_market).put(refresh_market).delete(delete_market),
        )
}
