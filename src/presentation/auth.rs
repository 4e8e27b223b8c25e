// API key authentication for the dashboard endpoints
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("DASHBOARD_API_KEY not configured")]
    NotConfigured,

    #[error("API key required")]
    Missing,

    #[error("Invalid API key")]
    Invalid,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Missing => StatusCode::UNAUTHORIZED,
            AuthError::Invalid => StatusCode::FORBIDDEN,
        };
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: Option<String>,
}

/// The query parameter takes precedence over the `X-API-Key` header
pub fn check_api_key(expected: Option<&str>, provided: Option<&str>) -> Result<(), AuthError> {
    let expected = expected.filter(|k| !k.is_empty()).ok_or(AuthError::NotConfigured)?;
    let provided = provided.filter(|k| !k.is_empty()).ok_or(AuthError::Missing)?;

    if provided == expected {
        Ok(())
    } else {
        Err(AuthError::Invalid)
    }
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let from_header = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let provided = query.api_key.as_deref().filter(|k| !k.is_empty()).or(from_header);

    if let Err(e) = check_api_key(state.api_key.as_deref(), provided) {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
        return Err(e);
    }

    Ok(next.run(request).await)
}
