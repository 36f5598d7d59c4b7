//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags and environment variables. Durations in the file are
//! whole seconds.
//!
//! ```yaml
//! port: 5000
//! allowed_origins:
//!   - http://localhost:3000
//! cache_ttl_secs: 3600
//! rate_limit_max_requests: 50
//! rate_limit_window_secs: 900
//! trust_proxy_headers: false
//! ```

use crate::cli::Cli;
use crate::{article, cache, inference, news, rate_limit, readiness};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port: u16,
    pub news_api_key: String,
    pub inference_api_key: String,
    pub allowed_origins: Vec<String>,
    pub news_endpoint: String,
    pub inference_endpoint: String,
    pub news_timeout_secs: u64,
    pub article_timeout_secs: u64,
    pub inference_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    /// Key the rate limiter on `X-Forwarded-For`/`X-Real-IP`. Only safe
    /// behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
    pub warmup_delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 5000,
            news_api_key: String::new(),
            inference_api_key: String::new(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            news_endpoint: news::DEFAULT_ENDPOINT.to_string(),
            inference_endpoint: inference::DEFAULT_ENDPOINT.to_string(),
            news_timeout_secs: news::DEFAULT_TIMEOUT.as_secs(),
            article_timeout_secs: article::DEFAULT_FETCH_TIMEOUT.as_secs(),
            inference_timeout_secs: inference::DEFAULT_TIMEOUT.as_secs(),
            cache_ttl_secs: cache::DEFAULT_TTL.as_secs(),
            cache_max_entries: cache::DEFAULT_MAX_ENTRIES,
            rate_limit_max_requests: rate_limit::DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: rate_limit::DEFAULT_WINDOW.as_secs(),
            trust_proxy_headers: false,
            warmup_delay_secs: readiness::DEFAULT_WARMUP_DELAY.as_secs(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("port", &self.port)
            .field("news_api_key", &redact(&self.news_api_key))
            .field("inference_api_key", &redact(&self.inference_api_key))
            .field("allowed_origins", &self.allowed_origins)
            .field("news_endpoint", &self.news_endpoint)
            .field("inference_endpoint", &self.inference_endpoint)
            .field("news_timeout_secs", &self.news_timeout_secs)
            .field("article_timeout_secs", &self.article_timeout_secs)
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("warmup_delay_secs", &self.warmup_delay_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl Settings {
    /// Build settings from the CLI, reading the YAML file it names (if any).
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
                info!(%path, "Loaded settings file");
                settings
            }
            None => Self::default(),
        };
        Ok(base.with_overrides(cli))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(key) = &cli.news_api_key {
            self.news_api_key = key.clone();
        }
        if let Some(key) = &cli.inference_api_key {
            self.inference_api_key = key.clone();
        }
        if let Some(origins) = &cli.allowed_origins {
            self.allowed_origins = origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(trust) = cli.trust_proxy_headers {
            self.trust_proxy_headers = trust;
        }
        self
    }

    /// Log a warning for each setting that will make requests fail.
    pub fn warn_on_missing_credentials(&self) {
        if self.news_api_key.is_empty() {
            warn!("NEWS_API_KEY is not set; /api/news requests will be rejected upstream");
        }
        if self.inference_api_key.is_empty() {
            warn!("HUGGINGFACE_API_KEY is not set; summaries will use the extractive fallback");
        }
    }

    pub fn news_timeout(&self) -> Duration {
        Duration::from_secs(self.news_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_secs(self.warmup_delay_secs)
    }
}
