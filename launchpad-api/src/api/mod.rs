//! REST API for trading metrics and the vanity keypair pool

mod handlers;
mod responses;
mod routes;
mod stream;

pub use responses::*;
pub use routes::*;

use crate::config::ApiConfig;
use crate::services::{TradingMetricsService, VanityService};
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Start the API server
pub async fn start_server(
    state: ApiState,
    config: &ApiConfig,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = create_router(state, config);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("API server listening on {}", config.bind_address);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(handle)
}

/// Create the main API application
pub fn create_router(state: ApiState, config: &ApiConfig) -> Router {
    let timed = Router::new()
        .merge(create_pool_routes())
        .merge(create_vanity_routes())
        .route("/health", get(health_handler))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));

    let app = timed
        .merge(create_stream_routes())
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if config.enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Health check handler
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "service": "launchpad-api"
    }))
}

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub metrics: Arc<TradingMetricsService>,
    pub vanity: Arc<VanityService>,
}

impl ApiState {
    pub fn new(metrics: Arc<TradingMetricsService>, vanity: Arc<VanityService>) -> Self {
        Self { metrics, vanity }
    }
}
