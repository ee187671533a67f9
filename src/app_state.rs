//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{EventBus, MarketRegistry};
use crate::service::MarketService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Market service for all business logic.
    pub market_service: Arc<MarketService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Configuration the gateway was started with.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Wires an empty registry, an event bus and the service from `config`.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let registry = Arc::new(MarketRegistry::new());
        let event_bus = EventBus::new(config.event_bus_capacity);
        let market_service = Arc::new(MarketService::new(
            registry,
            event_bus.clone(),
            config.default_slippage_bps,
        ));
        Self {
            market_service,
            event_bus,
            config: Arc::new(config),
        }
    }
}
