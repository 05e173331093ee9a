//! Object listing and dataset statistics.

use std::sync::Arc;

use astro_dataset::catalog::{compute_stats, paginate};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::objects::{ObjectQuery, ObjectResponse, PaginatedObjectsResponse, StatsResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_objects, get_stats),
    components(schemas(ObjectResponse, PaginatedObjectsResponse, StatsResponse))
)]
pub struct ObjectsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/objects", get(list_objects))
        .route("/stats", get(get_stats))
}

/// Return a paginated, filtered list of objects.
#[utoipa::path(
    get,
    path = "/objects",
    tag = "objects",
    params(ObjectQuery),
    responses(
        (status = 200, description = "Page of matching objects", body = PaginatedObjectsResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ObjectQuery>, QueryRejection>,
) -> Result<Json<PaginatedObjectsResponse>, ServerError> {
    let Query(query) = query?;
    let (page, page_size) = query.pagination().map_err(ServerError::BadRequest)?;

    let dataset = state.provider.get_dataset(false).await?;
    let matching = query.filter().apply(dataset.objects());
    let result = paginate(&matching, page, page_size);

    Ok(Json(PaginatedObjectsResponse {
        total: result.total,
        page,
        page_size,
        pages: result.pages,
        items: result.items.into_iter().map(ObjectResponse::from).collect(),
    }))
}

/// Summary statistics over the whole dataset.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "objects",
    responses(
        (status = 200, description = "Dataset statistics", body = StatsResponse),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ServerError> {
    let dataset = state.provider.get_dataset(false).await?;
    Ok(Json(compute_stats(dataset.objects()).into()))
}
