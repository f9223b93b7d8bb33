//! Shared types passed between adapters and services

use curve_core::{ReserveSnapshot, TradingMetrics};
use serde::{Deserialize, Serialize};

/// A reserve snapshot together with the pool it came from
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSnapshot {
    pub mint_address: String,
    pub reserves: ReserveSnapshot,
    /// Supply read from chain in whole tokens, when the account carries it
    pub total_supply: Option<f64>,
}

/// Trading metrics for one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetrics {
    pub mint_address: String,
    #[serde(flatten)]
    pub metrics: TradingMetrics,
}

/// A keypair handed out to the launch flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedKeypair {
    pub public_key: String,
    /// Base58 of the 64-byte Solana keypair
    pub secret_key: String,
    pub suffix: String,
}
