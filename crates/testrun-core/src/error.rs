//! Core domain errors.

use thiserror::Error;

/// Core domain errors for TestRun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid argument passed to a domain operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Worker address could not be used as an endpoint.
    #[error("Invalid worker address: '{0}'")]
    InvalidWorkerAddr(String),
}
