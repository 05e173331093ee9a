//! Remote fetcher for the NASA Exoplanet Archive TAP endpoint.

mod retry;

pub use retry::{RetryFailure, RetryPolicy};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::model::RawRecord;

/// Default archive endpoint.
pub const EXOPLANET_ENDPOINT: &str = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync";

/// Anything that can produce the brightest `limit` raw host-star rows.
///
/// The provider only talks to this trait, so tests can substitute a scripted
/// source and count calls.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    async fn fetch(&self, limit: usize) -> Result<Vec<RawRecord>, FetchError>;
}

/// ADQL query for the top `limit` rows with both magnitude and distance,
/// brightest first.
pub fn build_query(limit: usize) -> String {
    format!(
        "SELECT TOP {limit} pl_name, hostname, sy_snum, sy_vmag, sy_dist, st_spectype \
         FROM ps \
         WHERE sy_vmag IS NOT NULL AND sy_dist IS NOT NULL \
         ORDER BY sy_vmag ASC"
    )
}

/// reqwest-backed [`RecordSource`] with bounded retries.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    endpoint: String,
    retry: RetryPolicy,
    client: Client,
}

impl ArchiveClient {
    /// Create a client for `endpoint` whose every request is bounded by `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("astro-dataset/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self {
            endpoint: endpoint.into(),
            retry: RetryPolicy::default(),
            client,
        })
    }

    /// Override the retry policy (default: 3 attempts, 2 s base delay).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn query_url(&self, limit: usize) -> Result<Url, FetchError> {
        let query = build_query(limit);
        Url::parse_with_params(&self.endpoint, &[("query", query.as_str()), ("format", "json")])
            .map_err(|e| FetchError::InvalidResponse {
                message: format!("invalid archive endpoint {:?}: {e}", self.endpoint),
            })
    }

    async fn fetch_once(&self, url: &Url) -> Result<Vec<RawRecord>, AttemptError> {
        let resp = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(AttemptError::Send)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AttemptError::Fatal(FetchError::Status(status)));
        }

        let payload: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Send(e)
            } else {
                AttemptError::Fatal(FetchError::Decode(e))
            }
        })?;

        into_records(payload).map_err(AttemptError::Fatal)
    }
}

#[async_trait]
impl RecordSource for ArchiveClient {
    async fn fetch(&self, limit: usize) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.query_url(limit)?;
        info!(limit, endpoint = %self.endpoint, "fetching exoplanet data from archive");

        let url = &url;
        let records = self
            .retry
            .run(AttemptError::is_transient, move |attempt| {
                debug!(attempt, "archive request");
                self.fetch_once(url)
            })
            .await
            .map_err(|failure| match failure.error {
                AttemptError::Send(e) if failure.exhausted => FetchError::Network {
                    attempts: failure.attempts,
                    source: e,
                },
                AttemptError::Send(e) => FetchError::Request(e),
                AttemptError::Fatal(e) => e,
            })?;

        info!(rows = records.len(), "fetched rows from archive");
        Ok(records)
    }
}

/// Outcome of a single HTTP attempt, before retry classification.
#[derive(Debug)]
enum AttemptError {
    Send(reqwest::Error),
    Fatal(FetchError),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Send(e) => FetchError::is_transient(e),
            AttemptError::Fatal(_) => false,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Send(e) => write!(f, "{e}"),
            AttemptError::Fatal(e) => write!(f, "{e}"),
        }
    }
}

/// The archive answers with a JSON array of row objects.
fn into_records(payload: Value) -> Result<Vec<RawRecord>, FetchError> {
    let Value::Array(rows) = payload else {
        return Err(FetchError::InvalidResponse {
            message: "expected a JSON array of rows".to_owned(),
        });
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(map) => Ok(map),
            other => Err(FetchError::InvalidResponse {
                message: format!("row {i} is not an object: {other}"),
            }),
        })
        .collect()
}
