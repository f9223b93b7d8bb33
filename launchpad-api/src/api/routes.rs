//! API route definitions

use super::{handlers::*, ApiState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create pool trading routes
pub fn create_pool_routes() -> Router<ApiState> {
    Router::new().route("/pools/:mint/metrics", get(get_pool_metrics))
}

/// Create vanity pool routes
pub fn create_vanity_routes() -> Router<ApiState> {
    Router::new()
        .route("/vanity/pool", get(get_vanity_pool))
        .route("/vanity/pool/:suffix", get(get_vanity_pool_stats))
        .route("/vanity/reserve", post(reserve_keypair))
        .route("/vanity/keypairs/:public_key/used", post(mark_keypair_used))
}

/// Create streaming routes; these outlive the request timeout
pub fn create_stream_routes() -> Router<ApiState> {
    Router::new().route("/vanity/mine", get(mine_vanity))
}
