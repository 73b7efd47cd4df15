//! # citywatch-core
//!
//! Shared kernel for the CityWatch SOS service. Provides:
//!
//! - Unified error type ([`error::AppError`]) and result alias
//! - Typed identifiers for alerts and citizens
//! - The SOS alert entity and acknowledgement types
//! - The [`traits::store::AlertStore`] persistence seam
//! - Configuration schemas loaded from TOML + environment

pub mod alert;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use alert::{AlertStatus, GeoPoint, SosAlert};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::ack::{AckStatus, SosAck};
pub use types::id::{AlertId, CitizenId};
