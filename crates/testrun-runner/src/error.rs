//! Error types for toolchain operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while preparing sources or invoking the toolchain.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The toolchain binary could not be started.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploaded file name is unusable.
    #[error("Invalid file name: '{0}'")]
    InvalidFileName(String),

    /// Archive could not be unpacked.
    #[error("Failed to extract archive: {0}")]
    Extract(String),

    /// The test runner did not report the requested test.
    #[error("Test '{0}' was not reported by the test runner")]
    TestNotFound(String),

    /// The test runner failed without reporting a test outcome.
    #[error("Unexpected test runner output: {0}")]
    UnexpectedOutput(String),

    /// The toolchain did not finish in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
