//! In-process harness for router tests: a scripted archive behind a real
//! provider, and helpers to drive the router with `oneshot`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use astro_dataset::fetch::RecordSource;
use astro_dataset::{CacheStore, DatasetProvider, FetchError, RawRecord};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, request};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

/// Parsecs per light year, so sample distances survive normalization.
const PC_PER_LY: f64 = 1.0 / 3.26156;

pub struct ScriptedArchive {
    rows: Vec<RawRecord>,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl RecordSource for ScriptedArchive {
    async fn fetch(&self, limit: usize) -> Result<Vec<RawRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::InvalidResponse {
                message: "archive down".to_owned(),
            });
        }
        Ok(self.rows.iter().take(limit).cloned().collect())
    }
}

/// The ten bright stars used across router tests, as raw archive rows.
pub fn sample_rows() -> Vec<RawRecord> {
    [
        ("Sirius", "2", -1.46, 8.6, "A1V"),
        ("Canopus", "1", -0.74, 310.0, "B8Ia"),
        ("Arcturus", "1", -0.05, 36.7, "K1.5III"),
        ("Vega", "1", 0.03, 25.0, "A0V"),
        ("Acrux", "3", 0.76, 320.0, "B0.5IV"),
        ("Rigel", "3", 0.12, 860.0, "B8Ia"),
        ("Procyon", "2", 0.38, 11.5, "F5IV-V"),
        ("Achernar", "2", 0.46, 139.0, "B6Vep"),
        ("Betelgeuse", "1", 0.42, 642.0, "M2Iab"),
        ("Altair", "1", 0.77, 16.7, "A7V"),
    ]
    .into_iter()
    .map(|(name, stars, vmag, ly, spectral)| {
        json!({
            "pl_name": name,
            "hostname": name,
            "sy_snum": stars,
            "sy_vmag": vmag,
            "sy_dist": ly * PC_PER_LY,
            "st_spectype": spectral,
        })
        .as_object()
        .cloned()
        .unwrap()
    })
    .collect()
}

pub struct TestAppBuilder {
    rows: Vec<RawRecord>,
    fail: bool,
    admin_token: Option<String>,
    swagger: bool,
}

impl TestAppBuilder {
    pub fn rows(mut self, rows: Vec<RawRecord>) -> Self {
        self.rows = rows;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn admin_token(mut self, token: &str) -> Self {
        self.admin_token = Some(token.to_owned());
        self
    }

    pub fn swagger(mut self, enabled: bool) -> Self {
        self.swagger = enabled;
        self
    }

    pub fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let archive = Arc::new(ScriptedArchive {
            rows: self.rows,
            fail: self.fail,
            calls: AtomicUsize::new(0),
        });

        let mut config = Config::from_lookup(|_| None);
        config.admin_token = self.admin_token;
        config.enable_swagger = self.swagger;
        config.dataset = config.dataset.cache_path(dir.path().join("cache.json"));

        let provider = DatasetProvider::new(
            archive.clone(),
            CacheStore::new(config.dataset.cache_path.clone()),
        );
        let state = Arc::new(AppState {
            config: Arc::new(config),
            provider,
        });

        TestApp {
            state,
            archive,
            _dir: dir,
        }
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    archive: Arc<ScriptedArchive>,
    _dir: TempDir,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            rows: sample_rows(),
            fail: false,
            admin_token: None,
            swagger: true,
        }
    }

    pub fn with_sample_rows() -> Self {
        Self::builder().build()
    }

    pub fn with_rows(rows: Vec<RawRecord>) -> Self {
        Self::builder().rows(rows).build()
    }

    pub fn failing() -> Self {
        Self::builder().failing().build()
    }

    pub fn with_admin_token(token: &str) -> Self {
        Self::builder().admin_token(token).build()
    }

    pub fn fetch_calls(&self) -> usize {
        self.archive.calls.load(Ordering::SeqCst)
    }

    /// Send a bodiless request and decode the JSON response (`Null` if not JSON).
    pub async fn send(&self, req: request::Builder) -> (StatusCode, HeaderMap, Value) {
        self.send_request(req.body(Body::empty()).unwrap()).await
    }

    pub async fn send_request(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let (status, headers, bytes) = self.roundtrip(req).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// Like [`send`](Self::send) but returns the body text untouched.
    pub async fn send_raw(&self, req: request::Builder) -> (StatusCode, HeaderMap, String) {
        let (status, headers, bytes) = self.roundtrip(req.body(Body::empty()).unwrap()).await;
        (status, headers, String::from_utf8(bytes).unwrap())
    }

    async fn roundtrip(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let resp = routes::build(self.state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, bytes)
    }
}

pub fn get(uri: &str) -> request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn post(uri: &str) -> request::Builder {
    Request::builder().method("POST").uri(uri)
}
