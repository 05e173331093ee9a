//! Process-wide dataset snapshot with single-flight refresh.
//!
//! The provider has two states. While `Empty`, a read goes through the
//! durable cache and falls back to the archive. Once `Populated`, plain reads
//! return the in-memory snapshot and never touch the cache or the network
//! until [`DatasetProvider::invalidate`] is called. Stale cache data served
//! after a failed fetch is never memoized, so the next read retries the
//! archive.
//!
//! Refreshes run in their own spawned task and are shared: callers that
//! arrive while one is in flight await the same outcome, and dropping a
//! caller never cancels the refresh other waiters depend on.


use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{info, warn};

use crate::cache::{CachePayload, CacheStore};
use crate::error::DatasetError;
use crate::fetch::RecordSource;
use crate::model::{Dataset, DatasetSource};
use crate::normalize::normalize_all;

/// Default lifetime of a durable cache payload.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Default number of rows requested from the archive.
pub const DEFAULT_MAX_RECORDS: usize = 150;

type RefreshOutcome = Result<Arc<Dataset>, DatasetError>;
type InflightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Entry point for readers of the host-star dataset.
///
/// Cheap to clone; clones share the same snapshot and refresh slot.
#[derive(Clone)]
pub struct DatasetProvider {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn RecordSource>,
    cache: CacheStore,
    cache_ttl: Duration,
    max_records: usize,
    snapshot: RwLock<Option<Arc<Dataset>>>,
    inflight: Mutex<Option<(u64, InflightRefresh)>>,
    next_refresh_id: AtomicU64,
}

/// How a refresh obtains its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    /// Try the unexpired durable cache first, then the archive.
    CacheFirst,
    /// Go straight to the archive.
    Remote,
}

/// Collects provider settings before the shared state is created.
pub struct DatasetProviderBuilder {
    source: Arc<dyn RecordSource>,
    cache: CacheStore,
    cache_ttl: Duration,
    max_records: usize,
}

impl DatasetProviderBuilder {
    /// TTL written with each fresh cache payload.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Rows requested from the archive per fetch (at least 1).
    pub fn max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self
    }

    pub fn build(self) -> DatasetProvider {
        DatasetProvider {
            inner: Arc::new(Inner {
                source: self.source,
                cache: self.cache,
                cache_ttl: self.cache_ttl,
                max_records: self.max_records,
                snapshot: RwLock::new(None),
                inflight: Mutex::new(None),
                next_refresh_id: AtomicU64::new(0),
            }),
        }
    }
}

impl std::fmt::Debug for DatasetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetProvider")
            .field("cache", &self.inner.cache)
            .field("cache_ttl", &self.inner.cache_ttl)
            .field("max_records", &self.inner.max_records)
            .field("populated", &self.snapshot().is_some())
            .finish()
    }
}

impl DatasetProvider {
    /// A provider with the default TTL and record limit.
    pub fn new(source: Arc<dyn RecordSource>, cache: CacheStore) -> Self {
        Self::builder(source, cache).build()
    }

    pub fn builder(source: Arc<dyn RecordSource>, cache: CacheStore) -> DatasetProviderBuilder {
        DatasetProviderBuilder {
            source,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Return the dataset, refreshing it first when `force_refresh` is set or
    /// no snapshot has been populated yet.
    pub async fn get_dataset(&self, force_refresh: bool) -> Result<Arc<Dataset>, DatasetError> {
        if !force_refresh {
            if let Some(snapshot) = self.snapshot() {
                return Ok(snapshot);
            }
        }
        let mode = if force_refresh {
            RefreshMode::Remote
        } else {
            RefreshMode::CacheFirst
        };
        self.join_refresh(mode).await
    }

    /// Drop the in-memory snapshot. The durable cache is left untouched.
    pub fn invalidate(&self) {
        let previous = self
            .inner
            .snapshot
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        info!(had_snapshot = previous.is_some(), "dataset snapshot invalidated");
    }

    /// The current snapshot, if populated. Never performs I/O.
    pub fn snapshot(&self) -> Option<Arc<Dataset>> {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Join the in-flight refresh, or start one.
    fn join_refresh(&self, mode: RefreshMode) -> InflightRefresh {
        let mut slot = self.inner.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, inflight)) = slot.as_ref() {
            return inflight.clone();
        }

        let id = self
            .inner
            .next_refresh_id
            .fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        // The guard clears the slot when the task ends, panics included. It
        // cannot run before the slot is filled because we still hold the lock.
        let handle = tokio::spawn(async move {
            let _release = InflightRelease {
                inner: Arc::clone(&inner),
                id,
            };
            inner.refresh(mode).await
        });

        let shared = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(DatasetError::unavailable(format!("refresh task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        *slot = Some((id, shared.clone()));
        shared
    }
}

impl Inner {
    async fn refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        if mode == RefreshMode::CacheFirst {
            if let Some(payload) = self.cache.load().await {
                let dataset = self.populate(dataset_from(payload, DatasetSource::Cache));
                info!(objects = dataset.len(), "dataset loaded from cache");
                return Ok(dataset);
            }
        }

        match self.source.fetch(self.max_records).await {
            Ok(records) => {
                let dataset = Dataset {
                    objects: normalize_all(&records),
                    fetched_at: chrono::Utc::now(),
                    source: DatasetSource::Remote,
                };
                if let Err(e) = self.cache.save(&records, self.cache_ttl).await {
                    warn!(error = %e, path = %self.cache.path().display(), "failed to write dataset cache");
                }
                let dataset = self.populate(dataset);
                info!(
                    rows = records.len(),
                    objects = dataset.len(),
                    "dataset refreshed from archive"
                );
                Ok(dataset)
            }
            Err(fetch_err) => self.fall_back_to_stale(fetch_err.to_string()).await,
        }
    }

    async fn fall_back_to_stale(&self, reason: String) -> RefreshOutcome {
        let Some(payload) = self.cache.load_stale().await else {
            warn!(error = %reason, "archive fetch failed and no cached data exists");
            return Err(DatasetError::unavailable(reason));
        };

        let dataset = dataset_from(payload, DatasetSource::StaleCache);
        warn!(
            error = %reason,
            fetched_at = %dataset.fetched_at,
            objects = dataset.len(),
            "archive fetch failed; serving stale cached data"
        );

        // Served as-is: the snapshot stays untouched, so the next read
        // tries the archive again.
        Ok(Arc::new(dataset))
    }

    fn populate(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&dataset));
        dataset
    }
}

/// Empties the in-flight slot if it still belongs to refresh `id`.
struct InflightRelease {
    inner: Arc<Inner>,
    id: u64,
}

impl Drop for InflightRelease {
    fn drop(&mut self) {
        let mut slot = self.inner.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(slot.as_ref(), Some((current, _)) if *current == self.id) {
            *slot = None;
        }
    }
}

fn dataset_from(payload: CachePayload, source: DatasetSource) -> Dataset {
    Dataset {
        objects: normalize_all(&payload.records),
        fetched_at: payload.fetched_at,
        source,
    }
}
