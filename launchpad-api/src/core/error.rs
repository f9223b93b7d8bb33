//! Centralized error types for the launchpad API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use vanity_miner::{MinerError, StoreError};

use crate::api::ErrorResponse;

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Keypair store error: {0}")]
    KeypairStore(String),
}

/// Network-specific errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid account data for {address}: {reason}")]
    InvalidAccountData { address: String, reason: String },
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Network(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) | ApiError::Configuration(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
            timestamp: chrono::Utc::now().timestamp(),
        };
        (status, Json(body)).into_response()
    }
}

/// Helper to convert sqlx errors
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Storage(err.into())
    }
}

/// Helper to convert redis errors
impl From<redis::RedisError> for ApiError {
    fn from(err: redis::RedisError) -> Self {
        ApiError::Storage(StorageError::Cache(err.to_string()))
    }
}

impl From<deadpool_redis::PoolError> for ApiError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        ApiError::Storage(StorageError::Cache(err.to_string()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Network(NetworkError::Rpc(format!("Malformed response: {}", err)))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => ApiError::NotFound(format!("keypair {}", key)),
            StoreError::Duplicate { public_key } => {
                ApiError::Conflict(format!("keypair {} already stored", public_key))
            }
            other => ApiError::Storage(StorageError::KeypairStore(other.to_string())),
        }
    }
}

impl From<MinerError> for ApiError {
    fn from(err: MinerError) -> Self {
        match err {
            MinerError::InvalidSuffix { .. } | MinerError::InvalidRequest(_) => {
                ApiError::BadRequest(err.to_string())
            }
            MinerError::Store(store) => store.into(),
            other => ApiError::Other(anyhow::anyhow!(other.to_string())),
        }
    }
}
