//! Add-liquidity form handlers: field edits and the confirm review.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    EditInputRequest, EditInputResponse, ReviewAddLiquidityRequest, ReviewAddLiquidityResponse,
};
use crate::app_state::AppState;
use crate::domain::MarketId;
use crate::error::{ErrorResponse, GatewayError};
use crate::market::InputPair;

/// `POST /markets/:id/add-liquidity/edit` — Apply one field edit.
///
/// # Errors
///
/// Returns [`GatewayError`] if the market does not exist or the counterpart
/// cannot be derived from the snapshot. Unparsable input is not an error.
#[utoipa::path(
    post,
    path = "/api/v1/markets/{id}/add-liquidity/edit",
    tag = "Add Liquidity",
    summary = "Edit a deposit field",
    description = "Applies an edit to the deposit-token or PT field, derives the other field from the pool rate (unless the market has no liquidity yet) and returns the pool-share preview.",
    params(
        ("id" = uuid::Uuid, Path, description = "Market UUID"),
    ),
    request_body = EditInputRequest,
    responses(
        (status = 200, description = "Updated form", body = EditInputResponse),
        (status = 404, description = "Market not found", body = ErrorResponse),
        (status = 422, description = "Snapshot cannot price the edit", body = ErrorResponse),
    )
)]
pub async fn edit_input(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<EditInputRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let market_id = MarketId::from_uuid(id);
    let quote = state
        .market_service
        .edit_input(market_id, &req.current(), req.field, &req.input)
        .await?;
    Ok(Json(EditInputResponse::from_quote(market_id, &quote)))
}

/// `POST /markets/:id/add-liquidity/review` — Confirm a filled form.
///
/// # Errors
///
/// Returns [`GatewayError`] for a missing market, an incomplete pair, an
/// expired market, out-of-range slippage, or a failed liquidity formula.
#[utoipa::path(
    post,
    path = "/api/v1/markets/{id}/add-liquidity/review",
    tag = "Add Liquidity",
    summary = "Review a deposit",
    description = "Validates both amounts against the current snapshot and returns the mint breakdown with the slippage-adjusted minimum pool-share output.",
    params(
        ("id" = uuid::Uuid, Path, description = "Market UUID"),
    ),
    request_body = ReviewAddLiquidityRequest,
    responses(
        (status = 200, description = "Deposit review", body = ReviewAddLiquidityResponse),
        (status = 400, description = "Incomplete deposit or invalid slippage", body = ErrorResponse),
        (status = 404, description = "Market not found", body = ErrorResponse),
        (status = 409, description = "Market expired", body = ErrorResponse),
        (status = 422, description = "Liquidity formula failed", body = ErrorResponse),
    )
)]
pub async fn review_add_liquidity(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ReviewAddLiquidityRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let market_id = MarketId::from_uuid(id);
    let pair = InputPair::new(req.token_input, req.pt_input);
    let now = Utc::now();
    let review = state
        .market_service
        .review_add_liquidity(market_id, &pair, req.slippage_bps, now)
        .await?;
    Ok(Json(ReviewAddLiquidityResponse::from_review(&review, now)))
}

/// Add-liquidity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/markets/{id}/add-liquidity/edit", post(edit_input))
        .route(
            "/markets/{id}/add-liquidity/review",
            post(review_add_liquidity),
        )
}
