//! Helpers shared by the integration tests: a live server on an ephemeral
//! port and market snapshot payloads.

#![allow(dead_code)]

use std::net::SocketAddr;

use chrono::{Duration, Utc};
use serde_json::{Value, json};

use yield_market_gateway::api::build_app;
use yield_market_gateway::app_state::AppState;
use yield_market_gateway::config::GatewayConfig;

/// `1e18` as a decimal string.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Starts the full application on `127.0.0.1:0` and returns its address.
pub async fn spawn_server() -> SocketAddr {
    let config = GatewayConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..GatewayConfig::default()
    };
    let app = build_app(AppState::new(config));
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn token(symbol: &str) -> Value {
    json!({
        "address": format!("0x{}", symbol.to_lowercase()),
        "symbol": symbol,
        "decimals": 18,
    })
}

/// stETH market snapshot with 1:1 SY rate and index and the given raw
/// reserves.
pub fn snapshot(total_pt: u128, total_sy: u128, total_lp: u128, expiry_days: i64) -> Value {
    json!({
        "lp_token": token("LP-stETH"),
        "sy": {
            "token": token("SY-stETH"),
            "yield_token": token("wstETH"),
            "exchange_rate": ONE.to_string(),
        },
        "pt": token("PT-stETH"),
        "yt": {
            "token": token("YT-stETH"),
            "py_index_current": ONE.to_string(),
        },
        "state": {
            "total_pt": total_pt.to_string(),
            "total_sy": total_sy.to_string(),
            "total_lp": total_lp.to_string(),
        },
        "expiry": (Utc::now() + Duration::days(expiry_days)).to_rfc3339(),
    })
}

/// A seeded pool priced at 1.05 PT per SY.
pub fn steady_snapshot() -> Value {
    snapshot(1_050_000 * ONE, 1_000_000 * ONE, 1_000_000 * ONE, 90)
}

/// A market with no pool-share supply yet.
pub fn bootstrap_snapshot() -> Value {
    snapshot(0, 0, 0, 90)
}
