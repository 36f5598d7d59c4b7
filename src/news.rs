//! Headline relay to the news provider.
//!
//! The relay adds the server-held API key to the caller's query and returns
//! the provider's JSON untouched. Parameter values are not validated; the
//! provider is the authority on what it accepts.

use crate::errors::ApiError;
use crate::models::NewsQuery;
use reqwest::header::USER_AGENT;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, instrument};

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const NEWS_FAILED: &str = "Failed to fetch news";
const SERVICE_USER_AGENT: &str = concat!("news_digest/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct NewsRelay {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for NewsRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsRelay")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct Credential<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

impl NewsRelay {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Forward `query` to the provider and return its JSON body.
    #[instrument(level = "info", skip(self))]
    pub async fn top_headlines(&self, query: &NewsQuery) -> Result<serde_json::Value, ApiError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(query)
            .query(&Credential {
                api_key: &self.api_key,
            })
            .header(USER_AGENT, SERVICE_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| upstream_failure(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| upstream_failure(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(upstream_failure(provider_message(&body).unwrap_or_else(
                || format!("news provider returned {status}"),
            )));
        }

        let json = serde_json::from_str(&body)
            .map_err(|e| upstream_failure(format!("news provider returned invalid JSON: {e}")))?;
        info!(bytes = body.len(), "Relayed headlines");
        Ok(json)
    }
}

/// Pull the provider's own error message out of an error body, if any.
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn upstream_failure(details: String) -> ApiError {
    error!(details = %details, timestamp = %crate::utils::timestamp(), "News provider request failed");
    ApiError::Upstream {
        error: NEWS_FAILED,
        details,
    }
}
