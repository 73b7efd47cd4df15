//! Shared value types: identifiers and acknowledgements.

pub mod ack;
pub mod id;
