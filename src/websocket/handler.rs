//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//! Each connection subscribes to the content store's change events and
//! forwards them as `content_updated` messages.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();
    let mut events = state.store.subscribe();

    let connected = ServerMessage::Connected {
        connection_id: connection_id.clone(),
    };
    if send_message(&mut sender, &connected).await.is_err() {
        tracing::debug!(connection_id = %connection_id, "Failed to send connected message");
        return;
    }

    let open = state.ws_connections.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::debug!(connection_id = %connection_id, open, "WebSocket connected");

    // Replies from the receive side go out through the send task
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn_id_for_send = connection_id.clone();

    // Task to forward change events and replies to the WebSocket
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => ServerMessage::from(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(
                            connection_id = %conn_id_for_send,
                            skipped,
                            "WebSocket lagged behind change events"
                        );
                        ServerMessage::missed_updates()
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
            };

            if send_message(&mut sender, &message).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let conn_id_for_recv = connection_id.clone();

    // Task to receive messages from the WebSocket and answer them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&reply_tx, &conn_id_for_recv, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    let open = state.ws_connections.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::debug!(connection_id = %connection_id, open, "WebSocket disconnected");
}

async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let text = serde_json::to_string(message).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize message");
    })?;
    sender.send(Message::Text(text)).await.map_err(|_| ())
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
fn handle_ws_message(
    replies: &mpsc::UnboundedSender<ServerMessage>,
    connection_id: &str,
    message: Message,
) -> bool {
    let reply = match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => ServerMessage::Pong,
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    error = %e,
                    "Invalid client message"
                );
                ServerMessage::Error {
                    message: format!("Invalid message format: {}", e),
                }
            }
        },
        Message::Binary(_) => ServerMessage::Error {
            message: "Binary messages not supported".to_string(),
        },
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => return true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            return false;
        }
    };

    replies.send(reply).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_gets_pong() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(handle_ws_message(&tx, "c1", Message::Text(r#"{"type":"ping"}"#.to_string())));
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Pong));
    }

    #[test]
    fn test_invalid_message_keeps_connection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(handle_ws_message(&tx, "c1", Message::Text("nope".to_string())));
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Error { .. }));
    }

    #[test]
    fn test_close_ends_connection() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(!handle_ws_message(&tx, "c1", Message::Close(None)));
    }
}
