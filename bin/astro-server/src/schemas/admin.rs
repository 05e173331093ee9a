use astro_dataset::{Dataset, DatasetSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of an admin refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub dataset_count: usize,
    pub fetched_at: DateTime<Utc>,
    /// `remote`, `cache` or `stale_cache`.
    pub source: String,
}

impl From<&Dataset> for RefreshResponse {
    fn from(d: &Dataset) -> Self {
        let source = match d.source {
            DatasetSource::Remote => "remote",
            DatasetSource::Cache => "cache",
            DatasetSource::StaleCache => "stale_cache",
        };
        Self {
            dataset_count: d.len(),
            fetched_at: d.fetched_at,
            source: source.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvalidateResponse {
    pub invalidated: bool,
}
