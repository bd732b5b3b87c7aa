//! Change Notification Fan-out
//!
//! A broadcast channel carries [`ChangeEvent`]s from successful mutations
//! to every connected websocket client. Observers are best-effort: a
//! publish with no subscribers is not an error, and a slow client that
//! lags behind the channel capacity just skips ahead.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast;

use crate::core::ServerState;
use shared::message::{ChangeAction, ChangeEvent};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a change event to all subscribers.
    pub fn publish(
        &self,
        resource: &str,
        action: ChangeAction,
        id: impl ToString,
        data: Option<serde_json::Value>,
    ) {
        let event = ChangeEvent::new(resource, action, id, data);
        tracing::debug!(resource = %event.resource, action = %event.action, id = %event.id, "Publishing change event");
        if self.tx.send(event).is_err() {
            tracing::debug!("Change event dropped: no active subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

/// GET /ws - upgrade and stream change events as JSON text frames.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let rx = state.notifier.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(mut socket: WebSocket, mut rx: broadcast::Receiver<ChangeEvent>) {
    tracing::info!("Websocket client connected");
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(text) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Websocket client lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    // Clients only listen; anything but close is ignored
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
    tracing::info!("Websocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.publish("funko", ChangeAction::Created, 5, None);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.resource, "funko");
        assert_eq!(event.id, "5");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let notifier = Notifier::new();
        notifier.publish("funko", ChangeAction::Deleted, 5, None);
    }
}
