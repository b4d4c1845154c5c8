//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, T, E>(timeout: Duration, f: F, error_prefix: &str) -> (String, Option<T>)
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(value)) => ("healthy".to_string(), Some(value)),
        Ok(Err(e)) => (format!("{}: {}", error_prefix, e), None),
        Err(_) => ("timeout".to_string(), None),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations: Option<usize>,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "general",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheckResponse),
        (status = 503, description = "Document store unavailable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (store, organizations) = run_check(
        CHECK_TIMEOUT,
        state.organizations.list_ids(),
        "store error",
    )
    .await;

    let healthy = organizations.is_some();
    let response = HealthCheckResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        store,
        organizations: organizations.map(|ids| ids.len()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
