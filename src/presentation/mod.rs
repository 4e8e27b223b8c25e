// Presentation layer - HTTP surface
pub mod app_state;
pub mod auth;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::auth::require_api_key;
use crate::presentation::handlers::{dashboard_json, health_check};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/dashboard", get(dashboard_json))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/healthz", get(health_check))
        .merge(api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
