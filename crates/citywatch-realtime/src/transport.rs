//! Broadcast transport: room-targeted fan-out with sender exclusion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use citywatch_core::result::AppResult;

use crate::connection::handle::ConnectionId;
use crate::connection::pool::ConnectionPool;
use crate::event::types::OutboundEvent;
use crate::room::registry::RoomRegistry;

/// Pub/sub transport seam consumed by the SOS session manager.
///
/// Abstracted behind a trait so the session manager's tests can record
/// emissions instead of driving real sockets.
#[async_trait]
pub trait AlertTransport: Send + Sync + 'static {
    /// Emit an event to every member of a room, optionally excluding
    /// the originating connection. Returns the delivered count.
    async fn emit_to_room(
        &self,
        room: &str,
        event: &OutboundEvent,
        exclude: Option<ConnectionId>,
    ) -> AppResult<usize>;
}

/// [`AlertTransport`] over the live connection pool and room registry.
#[derive(Debug)]
pub struct RoomBroadcaster {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
}

impl RoomBroadcaster {
    /// Create a broadcaster over the shared pool and registry.
    pub fn new(pool: Arc<ConnectionPool>, rooms: Arc<RoomRegistry>) -> Self {
        Self { pool, rooms }
    }
}

#[async_trait]
impl AlertTransport for RoomBroadcaster {
    async fn emit_to_room(
        &self,
        room: &str,
        event: &OutboundEvent,
        exclude: Option<ConnectionId>,
    ) -> AppResult<usize> {
        let frame = serde_json::to_string(event)?;

        let mut delivered = 0;
        for conn_id in self.rooms.members(room) {
            if Some(conn_id) == exclude {
                continue;
            }
            match self.pool.get(&conn_id) {
                Some(handle) => {
                    if handle.send(frame.clone()) {
                        delivered += 1;
                    } else {
                        warn!(conn_id = %conn_id, room = %room, "Failed to deliver broadcast");
                    }
                }
                // Membership can outlive the pool entry briefly during
                // disconnect; skip silently.
                None => {}
            }
        }

        debug!(room = %room, delivered, "Broadcast emitted");
        Ok(delivered)
    }
}
