//! HTTP and WebSocket request handlers.

pub mod health;
pub mod sos;
pub mod ws;
