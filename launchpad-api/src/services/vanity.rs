//! Vanity pool operations: mining runs, statistics and allocation

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vanity_miner::{
    keypair_matches, KeypairAllocator, MiningRequest, MiningStream, PoolBreakdown, PoolStats,
    PoolStatsProvider, Suffix, SymmetricCipher, VanityKeypairRecord, VanityMiner,
};

use crate::config::VanityConfig;
use crate::core::{ApiError, ApiResult, ReservedKeypair, StorageError};

/// Caller-supplied knobs for a run; unset values take configured defaults
#[derive(Debug, Clone, Default)]
pub struct MineParams {
    pub suffix: String,
    pub count: Option<u32>,
    pub max_duration_ms: Option<u64>,
}

pub struct VanityService {
    miner: VanityMiner,
    stats: Arc<dyn PoolStatsProvider>,
    allocator: Arc<dyn KeypairAllocator>,
    cipher: Arc<dyn SymmetricCipher>,
    config: VanityConfig,
}

impl VanityService {
    pub fn new(
        miner: VanityMiner,
        stats: Arc<dyn PoolStatsProvider>,
        allocator: Arc<dyn KeypairAllocator>,
        cipher: Arc<dyn SymmetricCipher>,
        config: VanityConfig,
    ) -> Self {
        Self {
            miner,
            stats,
            allocator,
            cipher,
            config,
        }
    }

    /// Resolve defaults and limits, then start a run
    pub fn start_mining(&self, params: MineParams) -> ApiResult<MiningStream> {
        let target_count = params.count.unwrap_or(self.config.default_target_count);
        if target_count > self.config.max_target_count {
            return Err(ApiError::BadRequest(format!(
                "count {} exceeds the maximum of {}",
                target_count, self.config.max_target_count
            )));
        }

        // Durations past the cap are clamped rather than rejected
        let max_duration_ms = params
            .max_duration_ms
            .unwrap_or(self.config.default_max_duration_ms)
            .min(self.config.max_duration_cap_ms);

        let stream = self.miner.start(MiningRequest {
            suffix: params.suffix,
            target_count,
            max_duration: Duration::from_millis(max_duration_ms),
        })?;
        Ok(stream)
    }

    /// Counts for a suffix, keyed by its normalized form
    pub async fn pool_stats(&self, suffix: &str) -> ApiResult<(Suffix, PoolStats)> {
        let suffix = Suffix::parse(suffix)?;
        let stats = self.stats.pool_stats(suffix.as_str()).await?;
        Ok((suffix, stats))
    }

    pub async fn pool_breakdown(&self) -> ApiResult<PoolBreakdown> {
        Ok(self.stats.pool_breakdown().await?)
    }

    /// Hand out the oldest available keypair for `suffix`
    pub async fn reserve(&self, suffix: &str) -> ApiResult<ReservedKeypair> {
        let suffix = Suffix::parse(suffix)?;
        let record = self
            .allocator
            .reserve_keypair(suffix.as_str())
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("no available keypair for suffix '{}'", suffix))
            })?;

        let keypair = match self.unseal(&record) {
            Ok(keypair) => keypair,
            Err(e) => {
                // Leave the key for an instance holding the right master secret
                if let Err(release_err) = self.allocator.release_keypair(&record.public_key).await {
                    warn!(
                        "Failed to release keypair {} after a bad unseal: {}",
                        record.public_key, release_err
                    );
                }
                return Err(e.into());
            }
        };

        info!("Reserved vanity keypair {} for '{}'", record.public_key, suffix);
        Ok(ReservedKeypair {
            public_key: record.public_key,
            secret_key: bs58::encode(keypair).into_string(),
            suffix: record.suffix,
        })
    }

    /// Decrypt a stored keypair and check that it controls its public key
    fn unseal(&self, record: &VanityKeypairRecord) -> Result<Vec<u8>, StorageError> {
        let keypair = self.cipher.open(&record.secret_key_encrypted).map_err(|e| {
            warn!("Stored keypair {} could not be decoded: {}", record.public_key, e);
            StorageError::KeypairStore(format!("corrupt keypair {}: {}", record.public_key, e))
        })?;

        if !keypair_matches(&record.public_key, &keypair) {
            warn!(
                "Stored keypair {} does not decrypt to its own address; check VANITY_MASTER_SECRET",
                record.public_key
            );
            return Err(StorageError::KeypairStore(format!(
                "keypair {} failed verification",
                record.public_key
            )));
        }
        Ok(keypair)
    }

    pub async fn mark_used(&self, public_key: &str) -> ApiResult<()> {
        self.allocator.mark_used(public_key).await?;
        info!("Vanity keypair {} marked used", public_key);
        Ok(())
    }
}
