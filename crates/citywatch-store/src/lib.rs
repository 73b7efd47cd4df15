//! # citywatch-store
//!
//! [`citywatch_core::traits::AlertStore`] implementations:
//!
//! - [`postgres::PgAlertStore`] — production store over sqlx/PostgreSQL
//! - [`memory::MemoryAlertStore`] — hermetic store for tests and
//!   standalone runs

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;

pub use connection::DatabasePool;
pub use memory::MemoryAlertStore;
pub use postgres::PgAlertStore;
