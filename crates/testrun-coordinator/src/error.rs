//! Coordinator errors.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use thiserror::Error;

use testrun_core::CoreError;
use testrun_runner::RunnerError;

/// Failures while receiving or preparing an uploaded artifact.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Expected a multipart upload: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("Missing form field '{0}'")]
    MissingField(&'static str),

    #[error("Uploaded file has no name")]
    MissingFileName,

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Failures of a single worker request.
///
/// Every variant is handled the same way: the worker's chunk is reported as
/// a dispatch error and sibling chunks carry on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Connection, send, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The worker did not answer within the dispatch timeout.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The run was cancelled before the worker answered.
    #[error("cancelled")]
    Cancelled,

    /// The worker answered with a non-success status.
    #[error("worker responded {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The worker's response body could not be decoded.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// The dispatch unit itself failed.
    #[error("dispatch aborted: {0}")]
    Aborted(String),
}

/// Failures while assembling the coordinator at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid worker address: {0}")]
    InvalidWorker(#[from] CoreError),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] DispatchError),
}
