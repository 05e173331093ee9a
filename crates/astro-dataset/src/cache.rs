//! Durable, TTL-bounded JSON cache of the raw archive rows.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::model::RawRecord;

/// On-disk payload: `{ "records": [...], "fetched_at": "...", "expires_at": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePayload {
    pub records: Vec<RawRecord>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachePayload {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A single JSON file holding the last successful archive fetch.
///
/// Single writer per file; every save replaces the previous payload wholesale.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    max_stale: Option<Duration>,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_stale: None,
        }
    }

    /// Bound how old a payload may be and still serve as a stale fallback,
    /// measured from `fetched_at`. Unbounded by default.
    pub fn with_max_stale(mut self, max_stale: Option<Duration>) -> Self {
        self.max_stale = max_stale;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the payload if it exists, parses, and has not expired.
    pub async fn load(&self) -> Option<CachePayload> {
        let payload = self.read().await?;
        if payload.is_expired_at(Utc::now()) {
            info!(path = %self.path.display(), expires_at = %payload.expires_at, "cache expired");
            return None;
        }
        debug!(path = %self.path.display(), records = payload.records.len(), "cache hit");
        Some(payload)
    }

    /// Return any readable payload regardless of expiry, subject only to the
    /// optional staleness bound. Used when the archive is unreachable.
    pub async fn load_stale(&self) -> Option<CachePayload> {
        let payload = self.read().await?;
        if let Some(max_stale) = self.max_stale {
            let age = Utc::now().signed_duration_since(payload.fetched_at);
            let too_old = age
                .to_std()
                .map(|age| age > max_stale)
                .unwrap_or(false);
            if too_old {
                warn!(
                    path = %self.path.display(),
                    fetched_at = %payload.fetched_at,
                    max_stale_secs = max_stale.as_secs(),
                    "stale cache exceeds maximum staleness; ignoring"
                );
                return None;
            }
        }
        Some(payload)
    }

    /// Replace the cache with `records`, valid for `ttl` from now.
    ///
    /// The payload is written to a sibling temp file and renamed into place,
    /// so a reader sees either the old or the new payload in full.
    pub async fn save(&self, records: &[RawRecord], ttl: Duration) -> Result<(), CacheError> {
        let fetched_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let payload = CachePayload {
            records: records.to_vec(),
            fetched_at,
            expires_at: fetched_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let data = serde_json::to_vec(&payload)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        info!(
            path = %self.path.display(),
            records = payload.records.len(),
            expires_at = %payload.expires_at,
            "cache written"
        );
        Ok(())
    }

    async fn read(&self) -> Option<CachePayload> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cache file unreadable; ignoring");
                return None;
            }
        };

        match serde_json::from_slice::<CachePayload>(&data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                let err = CacheError::from(e);
                warn!(path = %self.path.display(), error = %err, "cache file is corrupt; ignoring");
                None
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn sample_records() -> Vec<RawRecord> {
        let row = json!({
            "pl_name": "Kepler-22 b",
            "hostname": "Kepler-22",
            "sy_snum": "1",
            "sy_vmag": "11.664",
            "sy_dist": "195.0",
            "st_spectype": "G5",
        });
        vec![row.as_object().cloned().unwrap()]
    }

    async fn write_raw(path: &Path, value: serde_json::Value) {
        tokio::fs::write(path, serde_json::to_vec(&value).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn save_then_load_returns_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested").join("cache.json"));

        store.save(&sample_records(), Duration::from_secs(60)).await.unwrap();
        let payload = store.load().await.expect("fresh payload");

        assert_eq!(payload.records, sample_records());
        assert_eq!(payload.expires_at - payload.fetched_at, chrono::Duration::seconds(60));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        assert!(store.load().await.is_none());
        assert!(store.load_stale().await.is_none());
    }

    #[tokio::test]
    async fn expired_payload_is_absent_but_still_usable_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        write_raw(
            &path,
            json!({
                "records": sample_records(),
                "fetched_at": "2020-01-01T00:00:00+00:00",
                "expires_at": "2020-01-02T00:00:00+00:00",
            }),
        )
        .await;

        let store = CacheStore::new(&path);
        assert!(store.load().await.is_none());
        let stale = store.load_stale().await.expect("stale payload");
        assert_eq!(stale.records, sample_records());
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        store.save(&sample_records(), Duration::ZERO).await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn max_stale_bounds_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        write_raw(
            &path,
            json!({
                "records": sample_records(),
                "fetched_at": "2020-01-01T00:00:00Z",
                "expires_at": "2020-01-02T00:00:00Z",
            }),
        )
        .await;

        let bounded = CacheStore::new(&path).with_max_stale(Some(Duration::from_secs(3600)));
        assert!(bounded.load_stale().await.is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn corrupt_payload_is_absent_and_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        tokio::fs::write(&path, br#"{"records": [{"pl_name": "trunc"#)
            .await
            .unwrap();

        let store = CacheStore::new(&path);
        assert!(store.load().await.is_none());
        assert!(store.load_stale().await.is_none());
        assert!(logs_contain("cache file is corrupt"));
    }

    #[tokio::test]
    async fn save_overwrites_previous_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache.json"));
        store.save(&sample_records(), Duration::from_secs(60)).await.unwrap();
        store.save(&[], Duration::from_secs(60)).await.unwrap();
        assert!(store.load().await.unwrap().records.is_empty());
    }
}
