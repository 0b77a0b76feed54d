//! Toolchain boundary.
//!
//! The coordinator and workers never call cargo directly; they go through
//! this trait so tests can substitute a scripted toolchain.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::error;

use testrun_core::{TestName, TestResult};

use crate::discovery::discover_tests;
use crate::error::RunnerError;

/// Output of a build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Whether the build succeeded.
    pub success: bool,

    /// Diagnostic text (compiler stderr).
    pub diagnostic: String,
}

/// Build and test operations for one source tree.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Build the sources in `source_dir`.
    ///
    /// A failed build is a successful call with `success == false`; `Err` is
    /// reserved for failing to run the build at all.
    async fn build(&self, source_dir: &Path) -> Result<BuildOutput, RunnerError>;

    /// Run exactly one test and report its outcome.
    async fn run_one(&self, source_dir: &Path, test: &TestName) -> Result<TestResult, RunnerError>;

    /// Find the tests declared in `source_files` (paths relative to `source_dir`).
    ///
    /// Source files are read on the blocking pool.
    async fn discover(&self, source_dir: &Path, source_files: &[PathBuf]) -> Vec<TestName> {
        let source_dir = source_dir.to_path_buf();
        let source_files = source_files.to_vec();

        tokio::task::spawn_blocking(move || discover_tests(&source_dir, &source_files))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Test discovery did not complete");
                Vec::new()
            })
    }
}
