//! SOS REST endpoints.
//!
//! The POST path shares the session manager with the WebSocket
//! gateway, so both surfaces enforce the same lifecycle; there is no
//! originating socket connection to exclude from the broadcast.
//! Unlike the gateway, failures here map to HTTP status codes instead
//! of error acks.

use axum::extract::State;
use axum::Json;

use citywatch_core::alert::SosAlert;
use citywatch_core::types::ack::SosAck;
use citywatch_realtime::event::types::SosRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/citizen/sos — submit or update an SOS over REST.
pub async fn submit_sos(
    State(state): State<AppState>,
    Json(request): Json<SosRequest>,
) -> Result<Json<SosAck>, ApiError> {
    let ack = state.engine.sessions.submit(None, request).await?;
    Ok(Json(ack))
}

/// GET /api/citizen/sos — list currently active alerts.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<SosAlert>>, ApiError> {
    let alerts = state.store.list_active().await?;
    Ok(Json(alerts))
}
