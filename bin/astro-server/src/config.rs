//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use astro_dataset::DatasetConfig;
use astro_dataset::config::default_cache_path;
use astro_dataset::fetch::EXOPLANET_ENDPOINT;

/// Runtime configuration for astro-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Comma-separated list of allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Bearer token required on `/admin` routes. `None` leaves them open.
    pub admin_token: Option<String>,

    /// Load the dataset before accepting requests.
    pub preload: bool,

    /// Everything the dataset pipeline needs.
    pub dataset: DatasetConfig,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dataset = DatasetConfig::new()
            .cache_ttl(Duration::from_secs(parse_or(&lookup, "NASA_CACHE_TTL_SECONDS", 86_400)))
            .max_records(parse_or(&lookup, "NASA_MAX_RECORDS", 150))
            .cache_path(
                non_empty("NASA_CACHE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_cache_path),
            )
            .archive_url(env_or("NASA_ARCHIVE_URL", EXOPLANET_ENDPOINT))
            .http_timeout(Duration::from_secs(parse_or(&lookup, "NASA_HTTP_TIMEOUT_SECONDS", 60)))
            .max_stale(
                non_empty("NASA_MAX_STALE_SECONDS")
                    .and_then(|v| v.trim().parse().ok())
                    .map(Duration::from_secs),
            );

        Self {
            bind_address: env_or("ASTRO_BIND", "0.0.0.0:8000"),
            log_level: env_or("ASTRO_LOG", "info"),
            log_json: flag(&lookup, "ASTRO_LOG_JSON", false),
            enable_swagger: flag(&lookup, "ASTRO_ENABLE_SWAGGER", true),
            cors_allowed_origins: non_empty("ASTRO_CORS_ORIGINS"),
            admin_token: non_empty("ASTRO_ADMIN_TOKEN"),
            preload: flag(&lookup, "ASTRO_PRELOAD", false),
            dataset,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
