//! Exoplanet host-star dataset: archive fetcher, normalizer, durable cache
//! and the process-wide snapshot provider, plus read-only catalog queries.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod provider;

pub use cache::{CachePayload, CacheStore};
pub use config::DatasetConfig;
pub use error::{CacheError, DatasetError, FetchError};
pub use fetch::{ArchiveClient, RecordSource, RetryPolicy};
pub use model::{AstronomicalObject, Dataset, DatasetSource, RawRecord};
pub use provider::{DatasetProvider, DatasetProviderBuilder};
