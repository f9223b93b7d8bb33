//! Trading metrics for a pool, with one-way graduation

use curve_core::{compute_trading_metrics, CurveParams};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{ApiResult, GraduationLatch, PoolMetrics, ReserveSnapshotProvider};

pub struct TradingMetricsService {
    provider: Arc<dyn ReserveSnapshotProvider>,
    latch: Arc<dyn GraduationLatch>,
    params: CurveParams,
    use_onchain_supply: bool,
}

impl TradingMetricsService {
    pub fn new(
        provider: Arc<dyn ReserveSnapshotProvider>,
        latch: Arc<dyn GraduationLatch>,
        params: CurveParams,
        use_onchain_supply: bool,
    ) -> Self {
        Self {
            provider,
            latch,
            params,
            use_onchain_supply,
        }
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Fetch a fresh snapshot and derive metrics from it
    pub async fn pool_metrics(&self, mint_address: &str) -> ApiResult<PoolMetrics> {
        let snapshot = self.provider.fetch_snapshot(mint_address).await?;

        let params = match snapshot.total_supply {
            Some(supply) if self.use_onchain_supply => self.params.with_total_supply(supply),
            _ => self.params,
        };
        let mut metrics = compute_trading_metrics(&snapshot.reserves, &params);

        if !metrics.is_available() {
            debug!("Reserves for {} are unavailable", mint_address);
        }

        // Latch failures degrade to the raw reading
        if metrics.is_graduated {
            match self.latch.is_latched(mint_address).await {
                Ok(true) => {}
                Ok(false) => {
                    info!("Pool {} graduated", mint_address);
                    if let Err(e) = self.latch.latch(mint_address).await {
                        warn!("Failed to latch graduation for {}: {}", mint_address, e);
                    }
                }
                Err(e) => warn!("Failed to read graduation latch for {}: {}", mint_address, e),
            }
        } else {
            match self.latch.is_latched(mint_address).await {
                Ok(true) => {
                    debug!("Pool {} reads ungraduated but is latched", mint_address);
                    metrics.mark_graduated();
                }
                Ok(false) => {}
                Err(e) => warn!("Failed to read graduation latch for {}: {}", mint_address, e),
            }
        }

        Ok(PoolMetrics {
            mint_address: snapshot.mint_address,
            metrics,
        })
    }
}
