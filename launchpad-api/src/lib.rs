//! Launchpad API Library
//!
//! Trading metrics over bonding curve reserves and a pool of pre-mined vanity
//! mint addresses, served over HTTP.

pub mod api;
pub mod config;
pub mod core;
pub mod database;
pub mod infrastructure;
pub mod rpc_client;
pub mod services;

// Re-export commonly used types
pub use config::LaunchpadConfig;
pub use crate::core::{ApiError, ApiResult, PoolMetrics, PoolSnapshot, ReservedKeypair};
pub use infrastructure::ServiceContainer;
