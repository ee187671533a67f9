//! Add-liquidity form DTOs: edit events and the confirm review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::AmountDto;
use crate::domain::MarketId;
use crate::error::GatewayError;
use crate::market::{InputField, InputPair, PairState};
use crate::service::{AddLiquidityReview, InputQuote};

/// Significant digits shown for the pool-share preview.
pub const LP_DISPLAY_DIGITS: usize = 6;

/// Request body for `POST /markets/:id/add-liquidity/edit`.
///
/// Carries the form's current field values and the edit to apply.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EditInputRequest {
    /// Current deposit-token field text.
    #[serde(default)]
    pub token_input: String,
    /// Current PT field text.
    #[serde(default)]
    pub pt_input: String,
    /// Field being edited: `token` or `pt`.
    #[schema(value_type = String, example = "token")]
    pub field: InputField,
    /// New text of the edited field.
    pub input: String,
}

impl EditInputRequest {
    /// The form's field values before the edit.
    #[must_use]
    pub fn current(&self) -> InputPair {
        InputPair::new(self.token_input.clone(), self.pt_input.clone())
    }
}

/// Pool-share preview failure reported alongside a successful edit.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreviewErrorDto {
    /// Numeric error code (same table as error responses).
    pub code: u32,
    /// Human-readable reason.
    pub message: String,
}

/// Response body for an edit, over HTTP and WebSocket.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditInputResponse {
    /// Market identifier.
    pub market_id: MarketId,
    /// Snapshot version the quote used.
    pub version: u64,
    /// Deposit-token field after the edit.
    pub token_input: String,
    /// PT field after the edit.
    pub pt_input: String,
    /// Pair classification.
    #[schema(value_type = String, example = "derived")]
    pub state: PairState,
    /// Pool-share preview, exact raw and decimal form.
    pub lp_preview: Option<AmountDto>,
    /// Pool-share preview rounded for display.
    pub lp_preview_display: Option<String>,
    /// Why the preview could not be computed.
    pub preview_error: Option<PreviewErrorDto>,
    /// Whether the form may proceed to review.
    pub can_submit: bool,
}

impl EditInputResponse {
    /// Builds the response for a quote on `market_id`.
    #[must_use]
    pub fn from_quote(market_id: MarketId, quote: &InputQuote) -> Self {
        let (lp_preview, lp_preview_display, preview_error) = match &quote.lp_preview {
            Ok(lp) => (
                Some(AmountDto::from(lp)),
                Some(lp.to_significant(LP_DISPLAY_DIGITS)),
                None,
            ),
            Err(err) => {
                let gateway = GatewayError::Quote(err.clone());
                (
                    None,
                    None,
                    Some(PreviewErrorDto {
                        code: gateway.error_code(),
                        message: err.to_string(),
                    }),
                )
            }
        };
        Self {
            market_id,
            version: quote.version,
            token_input: quote.pair.token_input.clone(),
            pt_input: quote.pair.pt_input.clone(),
            state: quote.state,
            lp_preview,
            lp_preview_display,
            preview_error,
            can_submit: quote.can_submit(),
        }
    }
}

/// Request body for `POST /markets/:id/add-liquidity/review`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewAddLiquidityRequest {
    /// Deposit-token field text.
    pub token_input: String,
    /// PT field text.
    pub pt_input: String,
    /// Slippage tolerance in basis points; server default when absent.
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

/// Response body for `POST /markets/:id/add-liquidity/review`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewAddLiquidityResponse {
    /// Market identifier.
    pub market_id: MarketId,
    /// Snapshot version the review used.
    pub version: u64,
    /// Deposit-token amount.
    pub token_amount: AmountDto,
    /// PT amount.
    pub pt_amount: AmountDto,
    /// SY equivalent of the deposit-token amount.
    pub sy_amount: AmountDto,
    /// Pool-share tokens credited to the depositor.
    pub lp_to_account: AmountDto,
    /// Pool-share tokens locked in the pool.
    pub lp_to_reserve: AmountDto,
    /// SY the pool takes.
    pub sy_used: AmountDto,
    /// PT the pool takes.
    pub pt_used: AmountDto,
    /// Slippage tolerance applied.
    pub slippage_bps: u32,
    /// Lowest pool-share amount to accept on submission.
    pub min_lp_out: AmountDto,
    /// Review timestamp.
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewAddLiquidityResponse {
    /// Builds the response from a service review.
    #[must_use]
    pub fn from_review(review: &AddLiquidityReview, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            market_id: review.market_id,
            version: review.version,
            token_amount: (&review.token_amount).into(),
            pt_amount: (&review.pt_amount).into(),
            sy_amount: (&review.sy_amount).into(),
            lp_to_account: (&review.addition.lp_to_account).into(),
            lp_to_reserve: (&review.addition.lp_to_reserve).into(),
            sy_used: (&review.addition.sy_used).into(),
            pt_used: (&review.addition.pt_used).into(),
            slippage_bps: review.slippage_bps,
            min_lp_out: (&review.min_lp_out).into(),
            reviewed_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::market::math::ONE;
    use crate::market::snapshot::tests::token;
    use crate::market::{Amount, QuoteError};

    fn quote(lp_preview: Result<Amount, QuoteError>) -> InputQuote {
        InputQuote {
            version: 4,
            pair: InputPair::new("10", "10.5"),
            state: PairState::Derived,
            token_amount: Some(Amount::from_raw(token("wstETH", 18), 10 * ONE)),
            pt_amount: Some(Amount::from_raw(token("PT-stETH", 18), 10 * ONE + ONE / 2)),
            lp_preview,
        }
    }

    #[test]
    fn edit_request_deserializes_field() {
        let json = r#"{"field":"pt","input":"3","token_input":"5"}"#;
        let Ok(req) = serde_json::from_str::<EditInputRequest>(json) else {
            panic!("valid request");
        };
        assert_eq!(req.field, InputField::Pt);
        assert_eq!(req.current(), InputPair::new("5", ""));
    }

    #[test]
    fn response_rounds_display_preview() {
        let lp = Amount::from_raw(token("LP-stETH", 18), 1_234_567_890_000_000_000);
        let response = EditInputResponse::from_quote(MarketId::new(), &quote(Ok(lp)));
        assert_eq!(response.lp_preview_display.as_deref(), Some("1.23457"));
        assert!(response.preview_error.is_none());
        assert!(response.can_submit);
        assert_eq!(response.version, 4);
    }

    #[test]
    fn response_reports_preview_error() {
        let response = EditInputResponse::from_quote(
            MarketId::new(),
            &quote(Err(QuoteError::ZeroLiquidityMinted)),
        );
        assert!(response.lp_preview.is_none());
        let Some(err) = response.preview_error else {
            panic!("expected preview error");
        };
        assert_eq!(err.code, 1003);
        assert!(!response.can_submit);
    }
}
