//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use crate::state::AppState;

/// GET /ws — WebSocket upgrade into the realtime gateway.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let gateway = state.engine.gateway.clone();
    let (handle, mut outbound_rx) = gateway.handle_connect();
    let conn_id = handle.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Forward queued outbound frames to the wire.
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                gateway.handle_inbound(conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            // Ping/pong frames are answered by axum itself.
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    gateway.handle_disconnect(conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
