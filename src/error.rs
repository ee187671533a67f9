//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::market::QuoteError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1004,
///     "message": "incomplete deposit: PT amount missing",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                     |
/// |-----------|-----------------|---------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request / 422 Unprocessable |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict    |
/// | 3000–3999 | Server          | 500 Internal Server Error       |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Market math rejected the inputs or the snapshot.
    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),

    /// A deposit was submitted without both amounts.
    #[error("incomplete deposit: {0} amount missing")]
    IncompleteDeposit(&'static str),

    /// Market with the given ID was not found.
    #[error("market not found: {0}")]
    MarketNotFound(uuid::Uuid),

    /// The market's PT has matured; deposits are closed.
    #[error("market expired: {0}")]
    MarketExpired(uuid::Uuid),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Quote(_) => 1003,
            Self::IncompleteDeposit(_) => 1004,
            Self::MarketNotFound(_) => 2001,
            Self::MarketExpired(_) => 2002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::IncompleteDeposit(_) => StatusCode::BAD_REQUEST,
            Self::Quote(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MarketNotFound(_) => StatusCode::NOT_FOUND,
            Self::MarketExpired(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Quote(QuoteError::InsufficientInitialLiquidity { minimum }) => Some(format!(
                "first deposit must mint more than {minimum} pool-share units"
            )),
            Self::Quote(QuoteError::ZeroLiquidityMinted) => {
                Some("increase both amounts".to_string())
            }
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
