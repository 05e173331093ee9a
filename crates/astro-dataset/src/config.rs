use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::error::FetchError;
use crate::fetch::{ArchiveClient, EXOPLANET_ENDPOINT, RetryPolicy};
use crate::provider::{DEFAULT_CACHE_TTL, DEFAULT_MAX_RECORDS, DatasetProvider};

/// Default per-request timeout for archive calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to wire a [`DatasetProvider`] against the live archive.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Lifetime of a freshly written cache payload.
    pub cache_ttl: Duration,
    /// Rows requested from the archive per fetch.
    pub max_records: usize,
    /// Location of the durable cache file.
    pub cache_path: PathBuf,
    pub archive_url: String,
    pub http_timeout: Duration,
    /// Oldest payload accepted by the stale fallback; `None` is unbounded.
    pub max_stale: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            max_records: DEFAULT_MAX_RECORDS,
            cache_path: default_cache_path(),
            archive_url: EXOPLANET_ENDPOINT.to_owned(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            max_stale: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl DatasetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = url.into();
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn max_stale(mut self, max_stale: Option<Duration>) -> Self {
        self.max_stale = max_stale;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the archive client, cache store and provider described here.
    pub fn build_provider(&self) -> Result<DatasetProvider, FetchError> {
        let client = ArchiveClient::new(self.archive_url.clone(), self.http_timeout)?
            .with_retry(self.retry);
        let cache = CacheStore::new(self.cache_path.clone()).with_max_stale(self.max_stale);

        Ok(DatasetProvider::builder(Arc::new(client), cache)
            .cache_ttl(self.cache_ttl)
            .max_records(self.max_records)
            .build())
    }
}

/// `<user cache dir>/astro-catalog/nasa_exoplanets.json`, or a path relative
/// to the working directory when the platform has no cache dir.
pub fn default_cache_path() -> PathBuf {
    match dirs_next::cache_dir() {
        Some(dir) => dir.join("astro-catalog").join("nasa_exoplanets.json"),
        None => PathBuf::from("data").join("cache").join("nasa_exoplanets.json"),
    }
}
