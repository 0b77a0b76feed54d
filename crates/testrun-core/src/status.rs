//! Status enums for workers, runs, and task reports.

use serde::{Deserialize, Serialize};

/// Liveness of a worker for one probe cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Worker answered its ping.
    Alive,
    /// Worker could not be reached, or answered with an error.
    #[default]
    Dead,
}

impl WorkerStatus {
    /// Returns true if the worker can receive a chunk this cycle.
    pub fn can_accept_chunks(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Stage of a coordinator run.
///
/// Runs move strictly forward; every run ends in `Finalized`, including runs
/// that fail before any test is attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStage {
    #[default]
    ReceivingArtifact,
    ExtractingSources,
    Building,
    SelectingStrategy,
    LocalRun,
    RemoteRun,
    Finalized,
}

/// How the tests of a task were executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStrategy {
    /// No worker was reachable; tests ran on the coordinator.
    Local,
    /// Tests were split across active workers.
    Remote,
}

/// Final state of a task report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    /// Task has not reached a testing decision yet.
    #[default]
    Pending,
    /// Build failed; no test was attempted.
    BuildFailed,
    /// Build succeeded but discovery found nothing to run.
    NoTestsDiscovered,
    /// Tests were executed (possibly with dispatch errors).
    Tested,
}
