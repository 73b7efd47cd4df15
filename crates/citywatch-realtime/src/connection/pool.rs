//! Shared registry of live connections.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::handle::{ConnectionHandle, ConnectionId};

/// All currently connected clients, addressable by connection id.
#[derive(Debug)]
pub struct ConnectionPool {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Outbound frame buffer size per connection.
    buffer_size: usize,
}

impl ConnectionPool {
    /// Create an empty pool.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            connections: DashMap::new(),
            buffer_size,
        }
    }

    /// Register a new connection.
    ///
    /// Returns the handle and the receiver the socket task drains.
    pub fn register(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.connections.insert(handle.id, handle.clone());
        (handle, rx)
    }

    /// Look up a connection by id.
    pub fn get(&self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a connection, returning its handle if it was present.
    pub fn remove(&self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.remove(id).map(|(_, handle)| {
            handle.mark_dead();
            handle
        })
    }

    /// Number of live connections.
    pub fn count(&self) -> usize {
        self.connections.len()
    }

    /// Snapshot of all connections.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
