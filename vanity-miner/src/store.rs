//! Persistence ports for the suffix pool
//!
//! The miner reads pool statistics and writes found keypairs through these
//! traits; the allocation process consumes them. [`MemoryKeypairStore`] backs
//! local runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

/// Storage errors surfaced by pool backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Public key already stored: {public_key}")]
    Duplicate { public_key: String },

    #[error("Keypair not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Allocation state of a mined keypair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypairStatus {
    Available,
    Reserved,
    Used,
}

impl KeypairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeypairStatus::Available => "available",
            KeypairStatus::Reserved => "reserved",
            KeypairStatus::Used => "used",
        }
    }
}

impl FromStr for KeypairStatus {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(KeypairStatus::Available),
            "reserved" => Ok(KeypairStatus::Reserved),
            "used" => Ok(KeypairStatus::Used),
            other => Err(StoreError::Backend(format!("Unknown keypair status: {}", other))),
        }
    }
}

/// Counts for one suffix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total: u64,
    pub available: u64,
    pub reserved: u64,
    pub used: u64,
}

impl PoolStats {
    fn count(&mut self, status: KeypairStatus) {
        self.total += 1;
        match status {
            KeypairStatus::Available => self.available += 1,
            KeypairStatus::Reserved => self.reserved += 1,
            KeypairStatus::Used => self.used += 1,
        }
    }
}

/// Pool stats keyed by (lower-cased) suffix
pub type PoolBreakdown = BTreeMap<String, PoolStats>;

/// Insert payload for a freshly mined keypair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVanityKeypair {
    pub suffix: String,
    pub public_key: String,
    pub secret_key_encrypted: String,
}

/// A stored keypair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VanityKeypairRecord {
    pub public_key: String,
    pub secret_key_encrypted: String,
    pub suffix: String,
    pub status: KeypairStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PoolStatsProvider: Send + Sync {
    /// Counts for one suffix (case-insensitive)
    async fn pool_stats(&self, suffix: &str) -> Result<PoolStats, StoreError>;

    /// Counts for every suffix in the pool
    async fn pool_breakdown(&self) -> Result<PoolBreakdown, StoreError>;
}

#[async_trait]
pub trait KeypairSink: Send + Sync {
    /// Persist a found keypair; fails with [`StoreError::Duplicate`] on a
    /// public key that is already stored
    async fn save_keypair(&self, keypair: &NewVanityKeypair) -> Result<(), StoreError>;
}

#[async_trait]
pub trait KeypairAllocator: Send + Sync {
    /// Move the oldest available keypair for `suffix` to reserved
    async fn reserve_keypair(&self, suffix: &str) -> Result<Option<VanityKeypairRecord>, StoreError>;

    /// Move a reserved keypair to used
    async fn mark_used(&self, public_key: &str) -> Result<(), StoreError>;

    /// Return a reserved keypair to available when it could not be handed out
    async fn release_keypair(&self, public_key: &str) -> Result<(), StoreError>;
}

/// In-process pool, insertion ordered
#[derive(Default)]
pub struct MemoryKeypairStore {
    records: Mutex<Vec<VanityKeypairRecord>>,
}

impl MemoryKeypairStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<VanityKeypairRecord> {
        self.lock().map(|records| records.clone()).unwrap_or_default()
    }

    pub fn contains(&self, public_key: &str) -> bool {
        self.lock()
            .map(|records| records.iter().any(|r| r.public_key == public_key))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<VanityKeypairRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PoolStatsProvider for MemoryKeypairStore {
    async fn pool_stats(&self, suffix: &str) -> Result<PoolStats, StoreError> {
        let suffix = suffix.to_ascii_lowercase();
        let records = self.lock()?;
        let mut stats = PoolStats::default();
        for record in records.iter().filter(|r| r.suffix == suffix) {
            stats.count(record.status);
        }
        Ok(stats)
    }

    async fn pool_breakdown(&self) -> Result<PoolBreakdown, StoreError> {
        let records = self.lock()?;
        let mut breakdown = PoolBreakdown::new();
        for record in records.iter() {
            breakdown.entry(record.suffix.clone()).or_default().count(record.status);
        }
        Ok(breakdown)
    }
}

#[async_trait]
impl KeypairSink for MemoryKeypairStore {
    async fn save_keypair(&self, keypair: &NewVanityKeypair) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        if records.iter().any(|r| r.public_key == keypair.public_key) {
            return Err(StoreError::Duplicate {
                public_key: keypair.public_key.clone(),
            });
        }
        records.push(VanityKeypairRecord {
            public_key: keypair.public_key.clone(),
            secret_key_encrypted: keypair.secret_key_encrypted.clone(),
            suffix: keypair.suffix.to_ascii_lowercase(),
            status: KeypairStatus::Available,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl KeypairAllocator for MemoryKeypairStore {
    async fn reserve_keypair(&self, suffix: &str) -> Result<Option<VanityKeypairRecord>, StoreError> {
        let suffix = suffix.to_ascii_lowercase();
        let mut records = self.lock()?;
        let record = records
            .iter_mut()
            .find(|r| r.suffix == suffix && r.status == KeypairStatus::Available);
        Ok(record.map(|record| {
            record.status = KeypairStatus::Reserved;
            record.clone()
        }))
    }

    async fn mark_used(&self, public_key: &str) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        let record = records
            .iter_mut()
            .find(|r| r.public_key == public_key && r.status == KeypairStatus::Reserved)
            .ok_or_else(|| StoreError::NotFound(public_key.to_string()))?;
        record.status = KeypairStatus::Used;
        Ok(())
    }

    async fn release_keypair(&self, public_key: &str) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        let record = records
            .iter_mut()
            .find(|r| r.public_key == public_key && r.status == KeypairStatus::Reserved)
            .ok_or_else(|| StoreError::NotFound(public_key.to_string()))?;
        record.status = KeypairStatus::Available;
        Ok(())
    }
}
