//! TestRun Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - The build toolchain
//! - Runtime specifics
//!
//! It also owns the chunk partitioner, since splitting a test list is pure
//! data manipulation shared by the coordinator and its tests.

pub mod error;
pub mod ids;
pub mod partition;
pub mod protocol;
pub mod report;
pub mod status;
pub mod worker;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::{RunId, TestName, WorkerAddr};
pub use partition::{partition, Chunk};
pub use report::{ErrorKind, ReportError, RunReport, TaskReport, TestResult};
pub use status::{ExecutionStrategy, RunStage, TaskOutcome, WorkerStatus};
pub use worker::WorkerProbe;
