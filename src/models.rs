//! Request and response bodies for the HTTP surface.
//!
//! - [`SummarizeRequest`] / [`SummaryResponse`]: `POST /summarize`
//! - [`NewsQuery`]: query string of `GET /api/news`, forwarded verbatim
//! - [`HealthResponse`]: `GET /health`
//! - [`ErrorBody`]: every error response
//!
//! `NewsQuery` keeps the provider's camelCase `pageSize` on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Headline query parameters. Absent fields are not forwarded.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn ok(summary: String) -> Self {
        Self {
            status: "ok".to_string(),
            summary: Some(summary),
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            summary: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
