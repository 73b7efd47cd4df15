//! Top-level realtime engine that ties the subsystems together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use citywatch_core::config::realtime::RealtimeConfig;
use citywatch_core::traits::AlertStore;

use crate::connection::pool::ConnectionPool;
use crate::gateway::EventGateway;
use crate::room::registry::RoomRegistry;
use crate::sos::session::SosSessionManager;
use crate::transport::RoomBroadcaster;

/// Central realtime engine coordinating connections, rooms, and the
/// SOS lifecycle.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection pool.
    pub pool: Arc<ConnectionPool>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// SOS session manager.
    pub sessions: Arc<SosSessionManager>,
    /// Event gateway.
    pub gateway: Arc<EventGateway>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Create a new engine over an alert store.
    pub fn new(config: RealtimeConfig, store: Arc<dyn AlertStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let pool = Arc::new(ConnectionPool::new(config.channel_buffer_size));
        let rooms = Arc::new(RoomRegistry::new());
        let broadcaster = Arc::new(RoomBroadcaster::new(pool.clone(), rooms.clone()));
        let sessions = Arc::new(SosSessionManager::new(store, broadcaster));
        let gateway = Arc::new(EventGateway::new(
            pool.clone(),
            rooms.clone(),
            sessions.clone(),
            config.max_rooms_per_connection,
        ));

        info!("Realtime engine initialized");

        Self {
            pool,
            rooms,
            sessions,
            gateway,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the realtime engine.
    pub fn shutdown(&self) {
        info!("Shutting down realtime engine");
        let _ = self.shutdown_tx.send(());

        for handle in self.pool.all() {
            self.rooms.leave_all(handle.id);
            self.pool.remove(&handle.id);
        }
        info!("Realtime engine shut down");
    }
}
