//! Axum-specific error types and mappings.
//!
//! Maps the core error taxonomy to HTTP status codes and a JSON
//! `{ "error", "status" }` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moltreader_core::{LoadError, SessionStoreError, SynthesisError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found (unknown session, index out of range).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (missing URL, page could not be loaded).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The speech engine failed.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<LoadError> for HttpError {
    fn from(err: LoadError) -> Self {
        // Fetch and extraction messages are user-facing as-is.
        Self::BadRequest(err.to_string())
    }
}

impl From<SynthesisError> for HttpError {
    fn from(err: SynthesisError) -> Self {
        tracing::error!(error = %err, "Speech synthesis failed");
        Self::ServiceUnavailable(err.to_string())
    }
}

impl From<SessionStoreError> for HttpError {
    fn from(err: SessionStoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
