//! Aggregate views for charts.

use std::collections::HashMap;
use std::sync::Arc;

use astro_dataset::catalog;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::analysis::{BinsQuery, CorrelationResponse, DistributionResponse, SpectralBreakdown};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        magnitude_distribution,
        distance_distribution,
        spectral_breakdown,
        magnitude_distance_correlation
    ),
    components(schemas(DistributionResponse, CorrelationResponse))
)]
pub struct AnalysisApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/magnitude-distribution", get(magnitude_distribution))
        .route("/distance-distribution", get(distance_distribution))
        .route("/spectral-breakdown", get(spectral_breakdown))
        .route("/magnitude-distance-correlation", get(magnitude_distance_correlation))
}

#[utoipa::path(
    get,
    path = "/analysis/magnitude-distribution",
    tag = "analysis",
    params(BinsQuery),
    responses(
        (status = 200, description = "Magnitude histogram", body = DistributionResponse),
        (status = 400, description = "bins out of range"),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn magnitude_distribution(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BinsQuery>, QueryRejection>,
) -> Result<Json<DistributionResponse>, ServerError> {
    let Query(query) = query?;
    let bins = query.bins().map_err(ServerError::BadRequest)?;
    let dataset = state.provider.get_dataset(false).await?;
    Ok(Json(catalog::magnitude_distribution(dataset.objects(), bins).into()))
}

#[utoipa::path(
    get,
    path = "/analysis/distance-distribution",
    tag = "analysis",
    params(BinsQuery),
    responses(
        (status = 200, description = "Distance histogram (light years)", body = DistributionResponse),
        (status = 400, description = "bins out of range"),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn distance_distribution(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BinsQuery>, QueryRejection>,
) -> Result<Json<DistributionResponse>, ServerError> {
    let Query(query) = query?;
    let bins = query.bins().map_err(ServerError::BadRequest)?;
    let dataset = state.provider.get_dataset(false).await?;
    Ok(Json(catalog::distance_distribution(dataset.objects(), bins).into()))
}

/// Object count per spectral type, most common first.
#[utoipa::path(
    get,
    path = "/analysis/spectral-breakdown",
    tag = "analysis",
    responses(
        (status = 200, description = "Counts keyed by spectral type", body = HashMap<String, usize>),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn spectral_breakdown(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SpectralBreakdown>, ServerError> {
    let dataset = state.provider.get_dataset(false).await?;
    Ok(Json(SpectralBreakdown(catalog::spectral_breakdown(dataset.objects()))))
}

#[utoipa::path(
    get,
    path = "/analysis/magnitude-distance-correlation",
    tag = "analysis",
    responses(
        (status = 200, description = "Paired magnitude and distance series", body = CorrelationResponse),
        (status = 503, description = "Dataset unavailable"),
    )
)]
pub async fn magnitude_distance_correlation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CorrelationResponse>, ServerError> {
    let dataset = state.provider.get_dataset(false).await?;
    Ok(Json(catalog::magnitude_distance_correlation(dataset.objects()).into()))
}
