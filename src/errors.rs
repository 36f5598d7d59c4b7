//! Errors surfaced to HTTP clients.
//!
//! Every variant renders as a JSON body with an `error` field, plus
//! `details` when there is an upstream message that is safe to show.
//! Inference failures are not here: they are absorbed by the fallback
//! summarizer and never reach a client of `/summarize`.

use crate::models::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const MODEL_LOADING: &str = "Model is still loading. Please try again in a moment.";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";
pub const ORIGIN_NOT_ALLOWED: &str = "Origin not allowed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    /// The news provider or the article host failed.
    #[error("{error}: {details}")]
    Upstream { error: &'static str, details: String },

    #[error("{}", MODEL_LOADING)]
    ModelNotReady,

    #[error("{}", TOO_MANY_REQUESTS)]
    RateLimited,

    #[error("{}", ORIGIN_NOT_ALLOWED)]
    OriginRejected,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::OriginRejected => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Upstream { error, details } => ErrorBody {
                error: error.to_string(),
                details: Some(details),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
