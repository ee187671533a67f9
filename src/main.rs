//! yield-market-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use yield_market_gateway::api;
use yield_market_gateway::app_state::AppState;
use yield_market_gateway::config::{GatewayConfig, LogFormat};
use yield_market_gateway::seed::load_seed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting yield-market-gateway");

    let listen_addr = config.listen_addr;
    let seed_path = config.market_seed_path.clone();
    let app_state = AppState::new(config);

    if let Some(path) = seed_path {
        load_seed(&path, &app_state.market_service)
            .await
            .context("failed to load market seed file")?;
    }

    let app = api::build_app(app_state);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("cannot bind {listen_addr}"))?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
