//! Solana vanity address miner
//!
//! Searches the Ed25519 keypair space for public keys whose base58 encoding
//! ends with a requested suffix (case-insensitive). A run is time-boxed,
//! persists every hit through a [`KeypairSink`] before reporting it, and
//! streams [`MiningEvent`]s to the caller until exactly one terminal event.

pub mod cipher;
pub mod error;
pub mod events;
pub mod keygen;
pub mod miner;
pub mod store;
pub mod suffix;

pub use cipher::{SymmetricCipher, XorKeystreamCipher};
pub use error::{MinerError, MinerResult};
pub use events::{CompleteSummary, MiningEvent};
pub use keygen::{benchmark, keypair_matches, BatchOutcome, KeyGenerator, MatchedKeypair, KEYPAIR_LEN};
pub use miner::{MinerSettings, MiningRequest, MiningStream, VanityMiner, MAX_RUN_DURATION};
pub use store::{
    KeypairAllocator, KeypairSink, KeypairStatus, MemoryKeypairStore, NewVanityKeypair,
    PoolBreakdown, PoolStats, PoolStatsProvider, StoreError, VanityKeypairRecord,
};
pub use suffix::Suffix;

#[cfg(test)]
mod test;
