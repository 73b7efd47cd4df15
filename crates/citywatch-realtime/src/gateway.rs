//! Event gateway — decodes inbound transport events and dispatches
//! them to the room registry or the SOS session manager.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::event::types::{InboundEvent, OutboundEvent};
use crate::room::registry::RoomRegistry;
use crate::room::POLICE_ROOM;
use crate::sos::session::SosSessionManager;

/// Maps inbound events to domain calls and domain results back to
/// outbound emissions toward the originating connection.
#[derive(Debug)]
pub struct EventGateway {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    sessions: Arc<SosSessionManager>,
    max_rooms_per_connection: usize,
}

impl EventGateway {
    /// Create a gateway over the shared subsystems.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        sessions: Arc<SosSessionManager>,
        max_rooms_per_connection: usize,
    ) -> Self {
        Self {
            pool,
            rooms,
            sessions,
            max_rooms_per_connection,
        }
    }

    /// Register a new connection and acknowledge it.
    ///
    /// Returns the handle and the receiver the socket task drains.
    pub fn handle_connect(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (handle, rx) = self.pool.register();
        self.send_to(&handle, &OutboundEvent::connected());
        info!(conn_id = %handle.id, "Client connected");
        (handle, rx)
    }

    /// Drop a connection: room membership dies with it.
    pub fn handle_disconnect(&self, conn_id: ConnectionId) {
        self.rooms.leave_all(conn_id);
        self.pool.remove(&conn_id);
        info!(conn_id = %conn_id, "Client disconnected");
    }

    /// Process one raw inbound frame from a connection.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Undecodable inbound event");
                self.send_to_id(
                    conn_id,
                    &OutboundEvent::Error {
                        code: "invalid_event".to_string(),
                        message: format!("Failed to decode event: {e}"),
                    },
                );
                return;
            }
        };

        match event {
            InboundEvent::JoinPoliceRoom => {
                if self.rooms.membership_count(conn_id) >= self.max_rooms_per_connection {
                    self.send_to_id(
                        conn_id,
                        &OutboundEvent::Error {
                            code: "max_rooms".to_string(),
                            message: format!(
                                "Maximum room memberships ({}) reached",
                                self.max_rooms_per_connection
                            ),
                        },
                    );
                    return;
                }
                self.rooms.join(conn_id, POLICE_ROOM);
                debug!(conn_id = %conn_id, "Joined police room");
            }
            InboundEvent::LeavePoliceRoom => {
                self.rooms.leave(conn_id, POLICE_ROOM);
                debug!(conn_id = %conn_id, "Left police room");
            }
            InboundEvent::SosTriggered(request) => {
                let ack = self.sessions.handle_sos_event(Some(conn_id), request).await;
                self.send_to_id(conn_id, &OutboundEvent::SosAck { ack });
            }
        }
    }

    fn send_to_id(&self, conn_id: ConnectionId, event: &OutboundEvent) {
        if let Some(handle) = self.pool.get(&conn_id) {
            self.send_to(&handle, event);
        }
    }

    fn send_to(&self, handle: &ConnectionHandle, event: &OutboundEvent) {
        match serde_json::to_string(event) {
            Ok(frame) => {
                handle.send(frame);
            }
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Failed to serialize outbound event");
            }
        }
    }
}
