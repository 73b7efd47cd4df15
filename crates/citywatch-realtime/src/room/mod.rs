//! Broadcast rooms: the addressing mechanism for targeted fan-out.

pub mod registry;

pub use registry::RoomRegistry;

/// Room joined by law-enforcement consoles; SOS broadcasts target it.
pub const POLICE_ROOM: &str = "police";
