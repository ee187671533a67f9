//! Domain layer: market identity, registry and event system.

pub mod event_bus;
pub mod market_entry;
pub mod market_event;
pub mod market_id;
pub mod market_registry;

pub use event_bus::EventBus;
pub use market_entry::{MarketEntry, MarketSummary};
pub use market_event::MarketEvent;
pub use market_id::MarketId;
pub use market_registry::MarketRegistry;
