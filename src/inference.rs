//! Client for the hosted summarization model.
//!
//! The model is reached through a single JSON POST carrying a bearer token.
//! Every call ends in an [`InferenceOutcome`]: either a summary, or a
//! [`InferenceFailure`] describing what went wrong so the caller can fall
//! back to the extractive summarizer. Nothing here retries; a call gets one
//! attempt bounded by the configured timeout.

use crate::utils::truncate_for_log;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Inputs shorter than this are not worth sending to the model.
pub const MIN_INPUT_CHARS: usize = 50;

/// Returned instead of calling the model when the input is too short.
pub const TOO_SHORT: &str = "Article content too short for summarization";

/// How much of the input text a failure keeps for diagnostics.
const SNIPPET_BYTES: usize = 120;
/// How much of an error response body a failure keeps.
const BODY_BYTES: usize = 500;

/// Why a call to the inference endpoint produced no summary.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request timed out after {0:?}")]
    Timeout(Duration),
    #[error("inference request failed: {0}")]
    Transport(String),
    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inference endpoint returned no summary: {body}")]
    MalformedResponse { body: String },
}

/// A failed inference call with enough context to log it.
#[derive(Debug)]
pub struct InferenceFailure {
    pub error: InferenceError,
    /// Leading part of the text that was sent.
    pub snippet: String,
}

impl fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Result of asking the model for a summary.
#[derive(Debug)]
pub enum InferenceOutcome {
    Summary(String),
    Failed(InferenceFailure),
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 30,
            do_sample: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InferenceItem {
    summary_text: Option<String>,
}

/// HTTP client for the summarization endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl InferenceClient {
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

    /// Ask the model to summarize `text`.
    ///
    /// Short inputs resolve to [`TOO_SHORT`] without a network call.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn summarize(&self, text: &str) -> InferenceOutcome {
        if text.trim().chars().count() < MIN_INPUT_CHARS {
            debug!("Input below minimum length; skipping inference");
            return InferenceOutcome::Summary(TOO_SHORT.to_string());
        }

        let t0 = Instant::now();
        let result = self.request(text).await;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match result {
            Ok(summary) => {
                info!(elapsed_ms, "Inference succeeded");
                InferenceOutcome::Summary(summary)
            }
            Err(error) => {
                warn!(elapsed_ms, error = %error, "Inference failed");
                InferenceOutcome::Failed(InferenceFailure {
                    error,
                    snippet: truncate_for_log(text, SNIPPET_BYTES),
                })
            }
        }
    }

    async fn request(&self, text: &str) -> Result<String, InferenceError> {
        let payload = InferenceRequest {
            inputs: text,
            parameters: GenerationParameters::default(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, BODY_BYTES),
            });
        }

        serde_json::from_str::<Vec<InferenceItem>>(&body)
            .ok()
            .and_then(|items| items.into_iter().next())
            .and_then(|item| item.summary_text)
            .filter(|summary| !summary.trim().is_empty())
            .ok_or_else(|| InferenceError::MalformedResponse {
                body: truncate_for_log(&body, BODY_BYTES),
            })
    }

    fn transport_error(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout(self.timeout)
        } else {
            InferenceError::Transport(e.without_url().to_string())
        }
    }
}
