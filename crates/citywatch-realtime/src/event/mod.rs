//! Wire-level event contracts for the realtime gateway.

pub mod types;

pub use types::{InboundEvent, OutboundEvent, SosRequest};
