//! WebSocket message types: envelope, commands, and server pushes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::EditInputResponse;
use crate::domain::MarketId;
use crate::error::GatewayError;
use crate::market::InputField;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// A response to the command with the given `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// A server-initiated event with a fresh ID.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// An error reply carrying the gateway error code.
    #[must_use]
    pub fn error(id: String, err: &GatewayError) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": err.error_code(),
                "message": err.to_string(),
            }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific markets.
    Subscribe {
        /// Market IDs to subscribe to. `"*"` subscribes to all markets.
        market_ids: Vec<String>,
    },
    /// Unsubscribe from events for specific markets.
    Unsubscribe {
        /// Market IDs to unsubscribe from. `"*"` drops the wildcard.
        market_ids: Vec<String>,
    },
    /// Edit one field of this connection's add-liquidity form.
    EditInput {
        /// Target market.
        market_id: MarketId,
        /// Field being edited.
        field: InputField,
        /// New text of the field.
        input: String,
    },
    /// Clear this connection's add-liquidity form.
    ResetInputs {
        /// Target market.
        market_id: MarketId,
    },
}

/// Push sent when a market refresh changes an open form's preview.
#[derive(Debug, Clone, Serialize)]
pub struct LpPreviewUpdated {
    /// Always `"lp_preview_updated"`.
    pub event_type: &'static str,
    /// The form re-quoted against the new snapshot.
    #[serde(flatten)]
    pub quote: EditInputResponse,
}

impl LpPreviewUpdated {
    /// Wraps a re-quoted form.
    #[must_use]
    pub const fn new(quote: EditInputResponse) -> Self {
        Self {
            event_type: "lp_preview_updated",
            quote,
        }
    }
}
