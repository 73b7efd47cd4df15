//! # citywatch-api
//!
//! HTTP/WebSocket surface for CityWatch. Exposes the SOS REST
//! endpoints, the health check, and the WebSocket upgrade into the
//! realtime gateway.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
