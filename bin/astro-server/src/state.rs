//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use astro_dataset::DatasetProvider;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Process-wide dataset snapshot.
    pub provider: DatasetProvider,
}
