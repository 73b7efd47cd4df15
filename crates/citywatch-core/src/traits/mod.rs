//! Abstract seams implemented by infrastructure crates.

pub mod store;

pub use store::AlertStore;
