//! Health, readiness and metrics endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tracing::error;

use crate::app::AppState;

pub fn health_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn ready(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    if state.service.ready().await {
        Ok("OK")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, StatusCode> {
    state.metrics.encode().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
