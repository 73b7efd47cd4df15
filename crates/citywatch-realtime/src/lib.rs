//! # citywatch-realtime
//!
//! Realtime SOS engine for CityWatch. Provides:
//!
//! - WebSocket connection handles and pool
//! - Room registry addressing the police broadcast audience
//! - Typed inbound/outbound event contracts
//! - The SOS session manager (alert lifecycle state machine)
//! - The event gateway mapping transport events to domain calls

pub mod connection;
pub mod event;
pub mod gateway;
pub mod room;
pub mod server;
pub mod sos;
pub mod transport;

pub use connection::pool::ConnectionPool;
pub use gateway::EventGateway;
pub use room::registry::RoomRegistry;
pub use server::RealtimeEngine;
pub use sos::session::SosSessionManager;
pub use transport::{AlertTransport, RoomBroadcaster};
