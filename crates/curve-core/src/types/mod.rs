//! # Core Type Definitions

pub mod metrics;
pub mod params;
pub mod snapshot;

// Re-export all types
pub use metrics::*;
pub use params::*;
pub use snapshot::*;
