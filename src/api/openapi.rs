//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::dto::{
    AmountDto, EditInputRequest, EditInputResponse, MarketDetailResponse, MarketListResponse,
    MarketSnapshotDto, MarketStateDto, MarketSummaryDto, PaginationMeta, PreviewErrorDto,
    RefreshMarketResponse, RegisterMarketResponse, ReviewAddLiquidityRequest,
    ReviewAddLiquidityResponse, SyDto, TokenDto, YtDto,
};
use crate::api::handlers::{add_liquidity, market, system};
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "yield-market-gateway",
        description = "Dual-input add-liquidity quotes for PT/SY yield markets"
    ),
    paths(
        market::register_market,
        market::list_markets,
        market::get_market,
        market::refresh_market,
        market::delete_market,
        add_liquidity::edit_input,
        add_liquidity::review_add_liquidity,
        system::health_handler,
        system::add_liquidity_config_handler,
    ),
    components(schemas(
        AmountDto,
        EditInputRequest,
        EditInputResponse,
        ErrorBody,
        ErrorResponse,
        MarketDetailResponse,
        MarketListResponse,
        MarketSnapshotDto,
        MarketStateDto,
        MarketSummaryDto,
        PaginationMeta,
        PreviewErrorDto,
        RefreshMarketResponse,
        RegisterMarketResponse,
        ReviewAddLiquidityRequest,
        ReviewAddLiquidityResponse,
        SyDto,
        TokenDto,
        YtDto,
        system::AddLiquidityConfig,
        system::HealthResponse,
    )),
    tags(
        (name = "Markets", description = "Market snapshot registration and refresh"),
        (name = "Add Liquidity", description = "Dual-input deposit form"),
        (name = "System", description = "Health and constants"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_add_liquidity_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/markets/{id}/add-liquidity/edit"));
        assert!(paths.contains_key("/api/v1/markets/{id}/add-liquidity/review"));
        assert!(paths.contains_key("/health"));
    }
}
