//! Worker request errors.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use testrun_runner::RunnerError;

/// Failures that prevent a chunk from being run at all.
///
/// Answered as `400 Bad Request` with the message as a plain-text body.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Expected a multipart upload: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("Missing form field '{0}'")]
    MissingField(&'static str),

    #[error("Uploaded file has no name")]
    MissingFileName,

    #[error("Failed upload: {0}")]
    Store(#[source] RunnerError),

    #[error("Failed extract: {0}")]
    Extract(#[source] RunnerError),
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Rejecting test request");
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
