//! Error types for the vanity miner

use crate::cipher::CipherError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors raised before a run starts or by the stores it talks to
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Invalid suffix '{suffix}': {reason}")]
    InvalidSuffix { suffix: String, reason: String },

    #[error("Invalid mining request: {0}")]
    InvalidRequest(String),

    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),
}

pub type MinerResult<T> = Result<T, MinerError>;
