//! Cargo-backed toolchain.
//!
//! Runs `cargo build` and `cargo test <name>` as subprocesses in the
//! extracted source directory and interprets their output.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use testrun_core::{TestName, TestResult};

use crate::error::RunnerError;
use crate::toolchain::{BuildOutput, Toolchain};

/// Toolchain that shells out to cargo.
#[derive(Debug, Clone)]
pub struct CargoToolchain {
    /// Path to the cargo executable.
    cargo_path: String,

    /// Upper bound for a single `cargo test` invocation.
    timeout: Option<Duration>,

    /// Upper bound for `cargo build`; falls back to `timeout`.
    build_timeout: Option<Duration>,

    /// Additional environment variables.
    env_vars: Vec<(String, String)>,
}

impl CargoToolchain {
    /// Create a toolchain using the given cargo executable.
    ///
    /// The path can be just "cargo" to use PATH lookup, or a full path.
    pub fn new(cargo_path: impl Into<String>) -> Self {
        Self {
            cargo_path: cargo_path.into(),
            timeout: None,
            build_timeout: None,
            env_vars: Vec::new(),
        }
    }

    /// Bound each cargo invocation. The child is killed on expiry.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound `cargo build` separately from test runs.
    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = Some(timeout);
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    async fn cargo(
        &self,
        source_dir: &Path,
        args: &[&str],
        limit: Option<Duration>,
    ) -> Result<Output, RunnerError> {
        let mut cmd = Command::new(&self.cargo_path);
        cmd.args(args)
            .current_dir(source_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        debug!(command = ?cmd, "Spawning cargo");

        let output = cmd.output();
        let result = match limit {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| RunnerError::Timeout(limit))?,
            None => output.await,
        };

        result.map_err(|source| {
            error!(error = %source, cargo = %self.cargo_path, "Failed to spawn cargo");
            RunnerError::Spawn {
                program: self.cargo_path.clone(),
                source,
            }
        })
    }
}

impl Default for CargoToolchain {
    fn default() -> Self {
        Self::new("cargo")
    }
}

#[async_trait]
impl Toolchain for CargoToolchain {
    async fn build(&self, source_dir: &Path) -> Result<BuildOutput, RunnerError> {
        info!(source_dir = %source_dir.display(), "Building");

        let output = self
            .cargo(source_dir, &["build"], self.build_timeout.or(self.timeout))
            .await?;
        let success = output.status.success();

        if success {
            info!(source_dir = %source_dir.display(), "Build successful");
        } else {
            warn!(
                source_dir = %source_dir.display(),
                exit_code = output.status.code().unwrap_or(-1),
                "Build failed"
            );
        }

        Ok(BuildOutput {
            success,
            diagnostic: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_one(&self, source_dir: &Path, test: &TestName) -> Result<TestResult, RunnerError> {
        info!(source_dir = %source_dir.display(), test = %test, "Running test");

        let output = self
            .cargo(source_dir, &["test", test.as_str()], self.timeout)
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match parse_test_outcome(&stdout, test.as_str()) {
            Some(LineOutcome::Passed) => {
                info!(test = %test, "Success");
                Ok(TestResult::passed(test.clone()))
            }
            Some(LineOutcome::Ignored) => {
                info!(test = %test, "Ignored");
                Ok(TestResult {
                    diagnostic: Some(IGNORED.to_string()),
                    ..TestResult::passed(test.clone())
                })
            }
            Some(LineOutcome::Failed) => {
                info!(test = %test, "Failure");
                let stderr = String::from_utf8_lossy(&output.stderr);
                Ok(TestResult::failed(
                    test.clone(),
                    failure_diagnostic(&stdout, &stderr),
                ))
            }
            None if output.status.success() => Err(RunnerError::TestNotFound(test.to_string())),
            None => Err(RunnerError::UnexpectedOutput(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }
}

/// Diagnostic attached to a test libtest skipped because of `#[ignore]`.
const IGNORED: &str = "ignored";

/// Status of one test as printed by libtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Passed,
    Failed,
    /// Skipped by `#[ignore]`. Reported as passing.
    Ignored,
}

/// Find the libtest status line for `name` in cargo test output.
///
/// Matches `test <path> ... <status>` where `<path>` is either the bare name
/// or ends in `::<name>`, optionally followed by ` - should panic`.
pub fn parse_test_outcome(stdout: &str, name: &str) -> Option<LineOutcome> {
    let suffix = format!("::{name}");

    stdout.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("test ")?;
        let (path, status) = rest.split_once(" ... ")?;
        let path = path.strip_suffix(" - should panic").unwrap_or(path);
        if path != name && !path.ends_with(&suffix) {
            return None;
        }
        match status.trim() {
            "ok" => Some(LineOutcome::Passed),
            "FAILED" => Some(LineOutcome::Failed),
            s if s.starts_with("ignored") => Some(LineOutcome::Ignored),
            _ => None,
        }
    })
}

/// Diagnostic for a failing test: the captured failure section if libtest
/// printed one, otherwise everything cargo wrote.
fn failure_diagnostic(stdout: &str, stderr: &str) -> String {
    match stdout.find("failures:") {
        Some(start) => {
            let section = &stdout[start..];
            let end = section.find("test result:").unwrap_or(section.len());
            section[..end].trim().to_string()
        }
        None => format!("{}\n{}", stdout.trim(), stderr.trim()).trim().to_string(),
    }
}
