//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::{BookingListResponse, PoolDetailResponse};
use crate::domain::{InventoryEvent, PoolId};
use crate::service::BookingService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<InventoryEvent>,
    service: Arc<BookingService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &service).await;
                        if let Some(json) = reply.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if subs.matches(&event) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&event).unwrap_or_default(),
                            );
                            if let Some(json) = msg.to_json()
                                && ws_tx.send(Message::text(json)).await.is_err() {
                                    break;
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

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    service: &BookingService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command");
    }
    let command = match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(command) => command,
        Err(e) => return WsMessage::error(msg.id, 404, format!("unknown command: {e}")),
    };

    match command {
        WsCommand::Subscribe {
            pool_ids,
            event_types,
        } => {
            let wildcard = pool_ids.iter().any(|s| s == "*");
            let ids = match parse_pool_ids(pool_ids.iter().filter(|s| *s != "*")) {
                Ok(ids) => ids,
                Err(bad) => return WsMessage::error(msg.id, 400, format!("invalid pool id: {bad}")),
            };
            subs.subscribe(&ids, wildcard);
            subs.set_event_types(&event_types);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                    "event_types": event_types,
                }),
            )
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let ids = match parse_pool_ids(pool_ids.iter()) {
                Ok(ids) => ids,
                Err(bad) => return WsMessage::error(msg.id, 400, format!("invalid pool id: {bad}")),
            };
            subs.unsubscribe(&ids);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                }),
            )
        }
        WsCommand::GetPool { pool_id } => {
            let Some(pool_id) = parse_pool_id(&pool_id) else {
                return WsMessage::error(msg.id, 400, format!("invalid pool id: {pool_id}"));
            };
            match service.get_pool(pool_id).await {
                Ok(details) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(PoolDetailResponse::from(details)).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
            }
        }
        WsCommand::RecentBookings { pool_id, limit } => {
            let Some(pool_id) = parse_pool_id(&pool_id) else {
                return WsMessage::error(msg.id, 400, format!("invalid pool id: {pool_id}"));
            };
            match service.recent_bookings(pool_id, limit).await {
                Ok(records) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(BookingListResponse::from(records)).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
            }
        }
    }
}

fn parse_pool_id(raw: &str) -> Option<PoolId> {
    raw.parse::<uuid::Uuid>().ok().map(PoolId::from_uuid)
}

/// Parses pool ID strings, returning the first invalid one on failure.
fn parse_pool_ids<'a>(raw: impl IntoIterator<Item = &'a String>) -> Result<Vec<PoolId>, String> {
    raw.into_iter()
        .map(|s| parse_pool_id(s).ok_or_else(|| s.clone()))
        .collect()
}
