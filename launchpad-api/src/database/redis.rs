//! Redis-backed graduation latch
//!
//! Latch keys never expire: graduation is permanent.

use anyhow::Result;
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

use crate::core::{ApiResult, GraduationLatch};

pub struct RedisGraduationLatch {
    pub(crate) pool: Pool,
    key_prefix: String,
}

impl RedisGraduationLatch {
    pub async fn new(redis_url: &str, key_prefix: &str) -> Result<Self> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

        Ok(Self {
            pool,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn key(&self, pool_id: &str) -> String {
        format!("{}:graduated:{}", self.key_prefix, pool_id)
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl GraduationLatch for RedisGraduationLatch {
    async fn is_latched(&self, pool_id: &str) -> ApiResult<bool> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(self.key(pool_id)).await?;
        Ok(exists)
    }

    async fn latch(&self, pool_id: &str) -> ApiResult<()> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set(self.key(pool_id), 1).await?;
        Ok(())
    }
}
