//! Liveness and readiness checks.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::schemas::health::{HealthResponse, ReadinessResponse, SERVICE_NAME};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_health, get_ready),
    components(schemas(HealthResponse, ReadinessResponse))
)]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/ready", get(get_ready))
}

/// Heartbeat endpoint.
///
/// Always 200; does not touch the dataset.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse)
    )
)]
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        service: SERVICE_NAME.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// Readiness check: 200 once a dataset can be served, 503 otherwise.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Dataset available", body = ReadinessResponse),
        (status = 503, description = "Dataset unavailable", body = ReadinessResponse),
    )
)]
pub async fn get_ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let mut body = ReadinessResponse {
        status: "ok".to_owned(),
        service: SERVICE_NAME.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        dataset_count: None,
        reason: None,
    };
    match state.provider.get_dataset(false).await {
        Ok(dataset) => {
            body.dataset_count = Some(dataset.len());
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            body.status = "error".to_owned();
            body.reason = Some(e.to_string());
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
