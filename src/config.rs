//! Gateway configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Unset or unparsable values fall back to defaults, except
//! `LISTEN_ADDR`, which must parse when present.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default slippage tolerance applied when a review request omits one.
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Slippage tolerance in basis points used when a review omits one.
    pub default_slippage_bps: u32,

    /// Per-request timeout for HTTP handlers, in seconds.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,

    /// Optional JSON file of market registrations loaded at startup.
    pub market_seed_path: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            event_bus_capacity: 10_000,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            request_timeout_secs: 30,
            log_format: LogFormat::Text,
            market_seed_path: None,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let default_slippage_bps =
            parse_env("DEFAULT_SLIPPAGE_BPS", defaults.default_slippage_bps).min(10_000);

        Ok(Self {
            listen_addr,
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            default_slippage_bps,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            log_format: LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref()),
            market_seed_path: std::env::var("MARKET_SEED_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
