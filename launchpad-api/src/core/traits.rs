//! Core trait abstractions (ports)
//!
//! Keypair pool ports live in `vanity_miner::store`; the ports here cover the
//! trading side.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::error::{ApiResult, StorageError};
use super::types::PoolSnapshot;

/// Source of fresh reserve snapshots
#[async_trait]
pub trait ReserveSnapshotProvider: Send + Sync {
    /// Fetch the current snapshot for a pool (identified by its mint)
    async fn fetch_snapshot(&self, pool_id: &str) -> ApiResult<PoolSnapshot>;
}

/// Remembers pools that have graduated so a stale read can't un-graduate them
#[async_trait]
pub trait GraduationLatch: Send + Sync {
    async fn is_latched(&self, pool_id: &str) -> ApiResult<bool>;

    async fn latch(&self, pool_id: &str) -> ApiResult<()>;
}

/// Process-local latch, used when Redis is disabled
#[derive(Default)]
pub struct MemoryGraduationLatch {
    graduated: Mutex<HashSet<String>>,
}

impl MemoryGraduationLatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ApiResult<std::sync::MutexGuard<'_, HashSet<String>>> {
        self.graduated
            .lock()
            .map_err(|_| StorageError::Cache("graduation latch lock poisoned".to_string()).into())
    }
}

#[async_trait]
impl GraduationLatch for MemoryGraduationLatch {
    async fn is_latched(&self, pool_id: &str) -> ApiResult<bool> {
        Ok(self.lock()?.contains(pool_id))
    }

    async fn latch(&self, pool_id: &str) -> ApiResult<()> {
        self.lock()?.insert(pool_id.to_string());
        Ok(())
    }
}
