//! API request handlers

use super::{responses::*, stream::mining_events, ApiState};
use crate::core::{ApiError, ApiResult, PoolMetrics, ReservedKeypair};
use crate::services::MineParams;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;
use vanity_miner::KeypairStatus;

/// Current trading metrics for a pool
pub async fn get_pool_metrics(
    State(state): State<ApiState>,
    Path(mint): Path<String>,
) -> ApiResult<Json<PoolMetrics>> {
    let metrics = state.metrics.pool_metrics(&mint).await?;
    Ok(Json(metrics))
}

/// Pool counts for every suffix
pub async fn get_vanity_pool(State(state): State<ApiState>) -> ApiResult<Json<PoolBreakdownResponse>> {
    let breakdown = state.vanity.pool_breakdown().await?;
    Ok(Json(breakdown.into()))
}

/// Pool counts for one suffix
pub async fn get_vanity_pool_stats(
    State(state): State<ApiState>,
    Path(suffix): Path<String>,
) -> ApiResult<Json<PoolStatsResponse>> {
    let (suffix, stats) = state.vanity.pool_stats(&suffix).await?;
    Ok(Json(PoolStatsResponse {
        suffix: suffix.to_string(),
        stats,
    }))
}

/// Start a mining run and stream its events
pub async fn mine_vanity(
    State(state): State<ApiState>,
    Query(query): Query<MineQuery>,
) -> ApiResult<impl IntoResponse> {
    let events = state.vanity.start_mining(MineParams {
        suffix: query.suffix.clone(),
        count: query.count,
        max_duration_ms: query.max_duration_ms,
    })?;

    let run_id = Uuid::new_v4();
    info!("Mining run {} started for suffix '{}'", run_id, query.suffix);

    Ok(([("x-mining-run-id", run_id.to_string())], mining_events(run_id, events)))
}

/// Allocate an available keypair
pub async fn reserve_keypair(
    State(state): State<ApiState>,
    Json(request): Json<ReserveRequest>,
) -> ApiResult<Json<ReservedKeypair>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let keypair = state.vanity.reserve(&request.suffix).await?;
    Ok(Json(keypair))
}

/// Retire a reserved keypair once its mint exists
pub async fn mark_keypair_used(
    State(state): State<ApiState>,
    Path(public_key): Path<String>,
) -> ApiResult<Json<KeypairStatusResponse>> {
    state.vanity.mark_used(&public_key).await?;
    Ok(Json(KeypairStatusResponse {
        public_key,
        status: KeypairStatus::Used.as_str().to_string(),
    }))
}
