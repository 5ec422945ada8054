//! Core domain types and abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod snapshot;
pub mod store;

// Re-export main types for cleaner imports
pub use error::{RateError, Result};
pub use snapshot::{NewSnapshot, RateSnapshot, Rates, RatesInput, SnapshotView};
pub use store::SnapshotStore;
