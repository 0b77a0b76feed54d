//! Error types for the CLI client.

use thiserror::Error;

/// Errors that can occur when talking to the coordinator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The coordinator answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Reading the archive from disk failed.
    #[error("failed to read {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
