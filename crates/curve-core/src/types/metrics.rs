//! # Trading Metrics
//! 
//! Human-facing numbers derived from a reserve snapshot.

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Metrics rendered by the trading panel.
///
/// `price_sol` and `market_cap_sol` are `None` when the snapshot cannot be
/// priced; they are never `NaN` or infinite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "camelCase"))]
pub struct TradingMetrics {
    pub price_sol: Option<f64>,
    pub price_display: String,
    pub market_cap_sol: Option<f64>,
    pub bonding_progress: f64,
    pub real_sol_reserves: f64,
    pub virtual_sol_reserves: f64,
    pub virtual_token_reserves: f64,
    pub is_graduated: bool,
}

impl TradingMetrics {
    pub fn is_available(&self) -> bool {
        self.price_sol.is_some()
    }

    /// Force the graduated flag on; graduation never reverts
    pub fn mark_graduated(&mut self) {
        self.is_graduated = true;
    }
}
