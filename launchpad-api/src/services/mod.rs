//! Business logic services

pub mod trading_metrics;
pub mod vanity;

pub use trading_metrics::TradingMetricsService;
pub use vanity::{MineParams, VanityService};
