//! Storage backends for the keypair pool and the graduation latch

pub mod postgres;
pub mod redis;

pub use postgres::PostgresKeypairStore;
pub use redis::RedisGraduationLatch;

use std::sync::Arc;
use vanity_miner::{KeypairAllocator, KeypairSink, PoolStatsProvider};

/// One backend seen through each pool port
#[derive(Clone)]
pub struct KeypairStoreHandles {
    pub stats: Arc<dyn PoolStatsProvider>,
    pub sink: Arc<dyn KeypairSink>,
    pub allocator: Arc<dyn KeypairAllocator>,
}

impl KeypairStoreHandles {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PoolStatsProvider + KeypairSink + KeypairAllocator + 'static,
    {
        Self {
            stats: store.clone(),
            sink: store.clone(),
            allocator: store,
        }
    }
}
