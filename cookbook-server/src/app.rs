//! Shared application state and the assembled router.

use axum::Router;
use cookbook_store::RecipeStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::ApiMetrics;
use crate::service::RecipeService;
use crate::{api, health};

/// Application state shared across handlers
pub struct AppState {
    pub service: RecipeService,
    pub metrics: ApiMetrics,
}

impl AppState {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        let metrics = ApiMetrics::new();
        Self {
            service: RecipeService::new(store, metrics.clone()),
            metrics,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api::recipe_router(state.clone()))
        .merge(health::health_router(state))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
