//! Service container for dependency injection

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use vanity_miner::{MemoryKeypairStore, SymmetricCipher, VanityMiner, XorKeystreamCipher};

use crate::api::ApiState;
use crate::config::{LaunchpadConfig, StorageBackend};
use crate::core::{GraduationLatch, MemoryGraduationLatch, ReserveSnapshotProvider};
use crate::database::{KeypairStoreHandles, PostgresKeypairStore, RedisGraduationLatch};
use crate::rpc_client::RpcSnapshotProvider;
use crate::services::{TradingMetricsService, VanityService};

/// Service container managing all dependencies
pub struct ServiceContainer {
    pub config: LaunchpadConfig,
    pub metrics: Arc<TradingMetricsService>,
    pub vanity: Arc<VanityService>,
    postgres: Option<PostgresKeypairStore>,
    redis: Option<Arc<RedisGraduationLatch>>,
}

impl ServiceContainer {
    /// Initialize the service container with all dependencies
    pub async fn new(config: LaunchpadConfig) -> Result<Self> {
        info!("Initializing service container");

        let (store, postgres) = match config.storage.backend {
            StorageBackend::Postgres => {
                let store = Arc::new(PostgresKeypairStore::new(&config.database).await?);
                info!("Keypair pool backed by PostgreSQL");
                (KeypairStoreHandles::from_store(store.clone()), Some((*store).clone()))
            }
            StorageBackend::Memory => {
                warn!("Keypair pool is in memory; mined keys are lost on restart");
                (KeypairStoreHandles::from_store(Arc::new(MemoryKeypairStore::new())), None)
            }
        };

        let redis = if config.redis.enabled {
            let latch =
                RedisGraduationLatch::new(&config.redis.url, &config.redis.key_prefix).await?;
            info!("Graduation latch backed by Redis");
            Some(Arc::new(latch))
        } else {
            None
        };
        let latch: Arc<dyn GraduationLatch> = match &redis {
            Some(redis) => redis.clone(),
            None => Arc::new(MemoryGraduationLatch::new()),
        };

        let provider: Arc<dyn ReserveSnapshotProvider> =
            Arc::new(RpcSnapshotProvider::from_config(&config.rpc)?);

        Ok(Self::from_parts(config, store, provider, latch).with_backends(postgres, redis))
    }

    /// Assemble services from already-built adapters
    pub fn from_parts(
        config: LaunchpadConfig,
        store: KeypairStoreHandles,
        provider: Arc<dyn ReserveSnapshotProvider>,
        latch: Arc<dyn GraduationLatch>,
    ) -> Self {
        let master_secret = LaunchpadConfig::master_secret();
        if master_secret.is_none() {
            warn!("VANITY_MASTER_SECRET is not set; using the built-in fallback key");
        }
        let cipher: Arc<dyn SymmetricCipher> =
            Arc::new(XorKeystreamCipher::from_master_secret(master_secret.as_deref()));

        let miner = VanityMiner::new(store.stats.clone(), store.sink.clone(), cipher.clone())
            .with_settings(config.vanity.miner_settings());

        let metrics = Arc::new(TradingMetricsService::new(
            provider,
            latch,
            config.curve.params(),
            config.curve.use_onchain_supply,
        ));
        let vanity = Arc::new(VanityService::new(
            miner,
            store.stats,
            store.allocator,
            cipher,
            config.vanity.clone(),
        ));

        Self {
            config,
            metrics,
            vanity,
            postgres: None,
            redis: None,
        }
    }

    fn with_backends(
        mut self,
        postgres: Option<PostgresKeypairStore>,
        redis: Option<Arc<RedisGraduationLatch>>,
    ) -> Self {
        self.postgres = postgres;
        self.redis = redis;
        self
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            metrics: self.metrics.clone(),
            vanity: self.vanity.clone(),
        }
    }

    /// Perform health check on all services
    pub async fn health_check(&self) -> Result<()> {
        info!("Performing health check");

        if let Some(postgres) = &self.postgres {
            postgres.health_check().await?;
        }
        if let Some(redis) = &self.redis {
            redis.health_check().await?;
        }

        info!("All services healthy");
        Ok(())
    }

    /// Graceful shutdown
    pub async fn shutdown(&self) {
        info!("Shutting down service container");
        if let Some(postgres) = &self.postgres {
            postgres.pool.close().await;
        }
    }
}
