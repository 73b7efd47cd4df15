//! Application state shared across all handlers.

use std::sync::Arc;

use citywatch_core::config::AppConfig;
use citywatch_core::traits::AlertStore;
use citywatch_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Alert persistence.
    pub store: Arc<dyn AlertStore>,
    /// Realtime engine (connections, rooms, SOS sessions).
    pub engine: Arc<RealtimeEngine>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}

impl AppState {
    /// Assemble the state from its constructed parts.
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AlertStore>, engine: Arc<RealtimeEngine>) -> Self {
        Self {
            config,
            store,
            engine,
        }
    }
}
