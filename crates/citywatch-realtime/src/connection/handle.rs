//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single connected client.
///
/// Holds the sender half of the connection's outbound frame queue. The
/// socket task owns the receiver and forwards frames to the wire.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Sender for serialized outbound frames.
    sender: mpsc::Sender<String>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    /// Create a new connection handle around a frame sender.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            alive: AtomicBool::new(true),
            connected_at: Utc::now(),
        }
    }

    /// Queue a serialized frame for delivery to this connection.
    ///
    /// Non-blocking: a full buffer drops the frame with a warning, a
    /// closed channel marks the connection dead. Returns whether the
    /// frame was queued.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
