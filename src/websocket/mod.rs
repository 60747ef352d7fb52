use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::middleware::auth::resolve_auth_user;
use crate::AppState;

pub mod hub;
pub mod protocol;

pub use hub::{CommandOutcome, Connection, Hub, HubError};
pub use protocol::{ClientCommand, ServerEvent};

/// `GET /ws`. Anyone may connect; a valid session cookie or bearer token only attaches the
/// username to the connection for the session-bound chat policy.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let session_user = match resolve_auth_user(&state, &headers).await {
        Ok(user) => user.map(|u| u.username),
        Err(e) => {
            tracing::warn!("WebSocket session lookup failed, continuing anonymously: {}", e);
            None
        }
    };

    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, session_user))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>, session_user: Option<String>) {
    let (mut sender, mut receiver) = socket.split();
    let Connection { id, mut events } = hub.connect(session_user).await;

    // Hub events -> client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to encode {} for {}: {}", event.name(), id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Client commands -> hub. Each command runs on its own task so that a disconnect does not
    // cancel a write already in flight.
    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(command) => {
                        let hub = recv_hub.clone();
                        tokio::spawn(async move { hub.dispatch(id, command).await });
                    }
                    Err(e) => tracing::warn!("Ignoring malformed frame from {}: {}", id, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.disconnect(id);
}
