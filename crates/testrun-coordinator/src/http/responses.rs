//! HTTP request and response types.

use serde::{Deserialize, Serialize};

use testrun_core::WorkerProbe;

/// Request body for worker registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterWorkerRequest {
    /// Worker base URL. `http://` is assumed when no scheme is given.
    pub remote: String,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Probe status of a single worker.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub remote: String,
    pub status: String,
    pub error: Option<String>,
    pub checked_at: String,
}

impl From<WorkerProbe> for WorkerResponse {
    fn from(probe: WorkerProbe) -> Self {
        Self {
            remote: probe.addr.to_string(),
            status: format!("{:?}", probe.status).to_uppercase(),
            error: probe.error,
            checked_at: probe.checked_at.to_rfc3339(),
        }
    }
}
