//! Dataset lifecycle endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::admin::{InvalidateResponse, RefreshResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(refresh_dataset, invalidate_dataset),
    components(schemas(RefreshResponse, InvalidateResponse))
)]
pub struct DatasetAdminApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dataset/refresh", post(refresh_dataset))
        .route("/dataset/invalidate", post(invalidate_dataset))
}

/// Force a fetch from the archive, falling back to stale cache on failure.
#[utoipa::path(
    post,
    path = "/admin/dataset/refresh",
    tag = "admin",
    responses(
        (status = 200, description = "Dataset refreshed", body = RefreshResponse),
        (status = 401, description = "Unauthorised (admin token required)"),
        (status = 503, description = "Archive and cache both unavailable"),
    )
)]
pub async fn refresh_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ServerError> {
    let dataset = state.provider.get_dataset(true).await?;
    info!(objects = dataset.len(), source = ?dataset.source, "dataset refreshed via admin API");
    Ok(Json(RefreshResponse::from(dataset.as_ref())))
}

/// Drop the in-memory snapshot; the durable cache is kept.
#[utoipa::path(
    post,
    path = "/admin/dataset/invalidate",
    tag = "admin",
    responses(
        (status = 200, description = "Snapshot cleared", body = InvalidateResponse),
        (status = 401, description = "Unauthorised (admin token required)"),
    )
)]
pub async fn invalidate_dataset(State(state): State<Arc<AppState>>) -> Json<InvalidateResponse> {
    state.provider.invalidate();
    Json(InvalidateResponse { invalidated: true })
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use crate::test_support::{TestApp, get, post};

    #[tokio::test]
    async fn refresh_fetches_again() {
        let app = TestApp::with_sample_rows();
        app.send(get("/objects")).await;
        let (status, _, body) = app.send(post("/admin/dataset/refresh")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dataset_count"], 10);
        assert_eq!(body["source"], "remote");
        assert_eq!(app.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_then_read_reloads_from_cache() {
        let app = TestApp::with_sample_rows();
        app.send(get("/stats")).await;
        let (status, _, body) = app.send(post("/admin/dataset/invalidate")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["invalidated"], true);
        assert!(app.state.provider.snapshot().is_none());

        let (status, _, _) = app.send(get("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn token_is_required_when_configured() {
        let app = TestApp::with_admin_token("s3cret");

        let (status, _, body) = app.send(post("/admin/dataset/invalidate")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorised");

        let wrong = post("/admin/dataset/invalidate")
            .header("authorization", "Bearer nope")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(app.send_request(wrong).await.0, StatusCode::UNAUTHORIZED);

        let right = post("/admin/dataset/invalidate")
            .header("authorization", "Bearer s3cret")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(app.send_request(right).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn data_routes_stay_open_when_token_is_set() {
        let app = TestApp::with_admin_token("s3cret");
        let (status, _, _) = app.send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
