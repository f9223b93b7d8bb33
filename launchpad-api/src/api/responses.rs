//! API request and response types

use serde::{Deserialize, Serialize};
use validator::Validate;
use vanity_miner::{PoolBreakdown, PoolStats};

/// Error body for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: i64,
}

/// Query parameters for a mining run
#[derive(Debug, Deserialize)]
pub struct MineQuery {
    pub suffix: String,
    pub count: Option<u32>,
    pub max_duration_ms: Option<u64>,
}

/// Body of a reservation request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReserveRequest {
    #[validate(length(min = 1, max = 44))]
    pub suffix: String,
}

/// Counts for a single suffix
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolStatsResponse {
    pub suffix: String,
    #[serde(flatten)]
    pub stats: PoolStats,
}

/// Counts for every suffix in the pool
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolBreakdownResponse {
    pub pools: PoolBreakdown,
    pub total_available: u64,
}

impl From<PoolBreakdown> for PoolBreakdownResponse {
    fn from(pools: PoolBreakdown) -> Self {
        let total_available = pools.values().map(|stats| stats.available).sum();
        Self {
            pools,
            total_available,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeypairStatusResponse {
    pub public_key: String,
    pub status: String,
}
