//! Worker liveness snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{WorkerAddr, WorkerStatus};

/// Result of probing one registered worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProbe {
    /// Worker endpoint.
    pub addr: WorkerAddr,

    /// Liveness for this probe cycle.
    pub status: WorkerStatus,

    /// Probe failure, if any.
    pub error: Option<String>,

    /// When the probe completed.
    pub checked_at: DateTime<Utc>,
}

impl WorkerProbe {
    /// A worker that answered its ping.
    pub fn alive(addr: WorkerAddr) -> Self {
        Self {
            addr,
            status: WorkerStatus::Alive,
            error: None,
            checked_at: Utc::now(),
        }
    }

    /// A worker that failed its ping.
    pub fn dead(addr: WorkerAddr, error: impl Into<String>) -> Self {
        Self {
            addr,
            status: WorkerStatus::Dead,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }

    /// Returns true if the worker is usable this cycle.
    pub fn is_alive(&self) -> bool {
        self.status.can_accept_chunks()
    }
}
