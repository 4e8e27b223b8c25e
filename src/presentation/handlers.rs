// HTTP request handlers
use crate::domain::dashboard::DashboardData;
use crate::presentation::app_state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard as JSON. Upstream failures end up in `errors`, never in the status code.
pub async fn dashboard_json(State(state): State<Arc<AppState>>) -> Json<DashboardData> {
    Json(state.aggregator.build().await)
}
