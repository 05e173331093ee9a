use thiserror::Error;

/// Errors returned by a [`RecordSource`](crate::fetch::RecordSource).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or timeout failures persisted through every retry.
    #[error("archive unreachable after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The archive answered with a non-2xx status.
    #[error("archive returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be read or decoded as JSON.
    #[error("failed to decode archive response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The archive answered with JSON of an unexpected shape.
    #[error("invalid archive response: {message}")]
    InvalidResponse { message: String },

    /// Any other request failure (bad URL, redirect loop, ...).
    #[error("archive request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl FetchError {
    /// Connection and timeout failures are worth another attempt.
    pub fn is_transient(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }
}

/// Errors raised while reading or writing the durable cache file.
///
/// On the read path these never leave the [`CacheStore`](crate::cache::CacheStore);
/// a corrupt payload is logged and treated as absent.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only error that crosses the [`DatasetProvider`](crate::provider::DatasetProvider)
/// boundary: no fresh or stale data could be obtained by any path.
///
/// `Clone` so a single refresh outcome can be handed to every waiter.
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    #[error("dataset unavailable: {reason}")]
    Unavailable { reason: String },
}

impl DatasetError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        DatasetError::Unavailable {
            reason: reason.into(),
        }
    }
}
