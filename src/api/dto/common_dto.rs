//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayError;
use crate::market::{Amount, Token};

/// Token metadata as carried in market snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenDto {
    /// Contract address.
    pub address: String,
    /// Human-readable symbol (e.g. `"PT-stETH"`).
    pub symbol: String,
    /// Number of decimal places (0..=38).
    pub decimals: u8,
}

impl TokenDto {
    /// Validates the metadata into a [`Token`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Quote`] for an unsupported precision.
    pub fn to_token(&self) -> Result<Token, GatewayError> {
        Ok(Token::new(self.address.clone(), self.symbol.clone(), self.decimals)?)
    }
}

impl From<&Token> for TokenDto {
    fn from(token: &Token) -> Self {
        Self {
            address: token.address().to_string(),
            symbol: token.symbol().to_string(),
            decimals: token.decimals(),
        }
    }
}

/// A token amount in both raw and human-readable form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AmountDto {
    /// Token symbol.
    pub symbol: String,
    /// Raw smallest-unit count (string-encoded u128).
    pub raw: String,
    /// Exact decimal rendering.
    pub formatted: String,
}

impl From<&Amount> for AmountDto {
    fn from(amount: &Amount) -> Self {
        Self {
            symbol: amount.token().symbol().to_string(),
            raw: amount.raw().to_string(),
            formatted: amount.to_exact(),
        }
    }
}

/// Parses a string-encoded raw `u128`, naming `field` on failure.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if `value` is not an unsigned
/// integer that fits in 128 bits.
pub fn parse_raw(field: &str, value: &str) -> Result<u128, GatewayError> {
    value
        .parse()
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid {field}: {value}")))
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        }
        .clamped();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
    }

    #[test]
    fn parse_raw_rejects_garbage() {
        assert_eq!(parse_raw("total_pt", "1050").ok(), Some(1050));
        assert!(matches!(
            parse_raw("total_pt", "-1"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(parse_raw("total_pt", "1.5").is_err());
    }

    #[test]
    fn token_dto_validates_precision() {
        let dto = TokenDto {
            address: "0x01".to_string(),
            symbol: "X".to_string(),
            decimals: 40,
        };
        assert!(matches!(dto.to_token(), Err(GatewayError::Quote(_))));
    }
}
