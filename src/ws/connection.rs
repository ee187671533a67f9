//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection: commands
//! from the client, filtered market events from the bus, and re-quotes of
//! open add-liquidity forms when their market is refreshed.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{LpPreviewUpdated, WsCommand, WsMessage};
use super::subscription::{SubscriptionManager, parse_targets};
use crate::api::dto::EditInputResponse;
use crate::domain::{MarketEvent, MarketId};
use crate::error::GatewayError;
use crate::market::DualInput;
use crate::service::{MarketService, quote_pair};

/// Per-connection state: subscriptions and one form per market.
#[derive(Debug)]
pub struct Session {
    service: Arc<MarketService>,
    subs: SubscriptionManager,
    forms: HashMap<MarketId, DualInput>,
}

impl Session {
    /// A fresh session with no subscriptions and no open forms.
    #[must_use]
    pub fn new(service: Arc<MarketService>) -> Self {
        Self {
            service,
            subs: SubscriptionManager::new(),
            forms: HashMap::new(),
        }
    }

    /// Handles one text frame and returns the reply.
    pub async fn handle_text(&mut self, text: &str) -> WsMessage {
        let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
            return WsMessage::error(
                String::new(),
                &GatewayError::InvalidRequest("malformed JSON".to_string()),
            );
        };
        let command = match serde_json::from_value::<WsCommand>(msg.payload) {
            Ok(command) => command,
            Err(err) => {
                return WsMessage::error(
                    msg.id,
                    &GatewayError::InvalidRequest(format!("unknown command: {err}")),
                );
            }
        };
        match self.dispatch(command).await {
            Ok(payload) => WsMessage::response(msg.id, payload),
            Err(err) => WsMessage::error(msg.id, &err),
        }
    }

    async fn dispatch(&mut self, command: WsCommand) -> Result<serde_json::Value, GatewayError> {
        match command {
            WsCommand::Subscribe { market_ids } => {
                let (ids, wildcard, rejected) = parse_targets(&market_ids);
                self.subs.subscribe(&ids, wildcard);
                Ok(serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "count": self.subs.count(),
                    "wildcard": self.subs.is_subscribed_all(),
                }))
            }
            WsCommand::Unsubscribe { market_ids } => {
                let (ids, wildcard, rejected) = parse_targets(&market_ids);
                self.subs.unsubscribe(&ids, wildcard);
                Ok(serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "remaining_count": self.subs.count(),
                    "wildcard": self.subs.is_subscribed_all(),
                }))
            }
            WsCommand::EditInput {
                market_id,
                field,
                input,
            } => {
                let (market, version) = self.service.snapshot(market_id).await?;
                let form = self.forms.entry(market_id).or_default();
                form.edit(&market, field, &input)?;
                let quote = quote_pair(&market, version, form.pair().clone(), form.state());
                to_payload(&EditInputResponse::from_quote(market_id, &quote))
            }
            WsCommand::ResetInputs { market_id } => {
                let had_form = self.forms.remove(&market_id).is_some();
                Ok(serde_json::json!({
                    "market_id": market_id,
                    "reset": had_form,
                }))
            }
        }
    }

    /// Messages to push for a bus event: the event itself when subscribed,
    /// plus a re-quoted preview when a refreshed market has an open form.
    pub async fn handle_event(&mut self, event: &MarketEvent) -> Vec<WsMessage> {
        let market_id = event.market_id();
        let mut out = Vec::new();
        if self.subs.matches(market_id)
            && let Ok(payload) = serde_json::to_value(event)
        {
            out.push(WsMessage::event(payload));
        }

        match event {
            MarketEvent::MarketRefreshed { .. } => {
                if let Some(form) = self.forms.get(&market_id) {
                    let pair = form.pair().clone();
                    let state = form.state();
                    match self.service.requote(market_id, pair, state).await {
                        Ok(quote) => {
                            let update = LpPreviewUpdated::new(EditInputResponse::from_quote(
                                market_id, &quote,
                            ));
                            if let Ok(payload) = serde_json::to_value(&update) {
                                out.push(WsMessage::event(payload));
                            }
                        }
                        Err(err) => {
                            tracing::debug!(%market_id, error = %err, "requote after refresh failed");
                        }
                    }
                }
            }
            MarketEvent::MarketRemoved { .. } => {
                self.forms.remove(&market_id);
            }
            MarketEvent::MarketRegistered { .. } => {}
        }
        out
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Internal(e.to_string()))
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and replies to each.
/// - Forwards matching events from the [`broadcast::Receiver`] and pushes
///   re-quoted previews for open forms.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<MarketEvent>,
    market_service: Arc<MarketService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut session = Session::new(market_service);

    'conn: loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = session.handle_text(&text).await;
                        if send(&mut ws_tx, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(market_event) => {
                        for push in session.handle_event(&market_event).await {
                            if send(&mut ws_tx, &push).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

async fn send<S>(sink: &mut S, msg: &WsMessage) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).unwrap_or_default();
    sink.send(Message::text(json)).await
}
