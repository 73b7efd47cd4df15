//! The SOS alert lifecycle.

pub mod session;

pub use session::SosSessionManager;
