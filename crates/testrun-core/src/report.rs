//! Test results and the reports they are aggregated into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ExecutionStrategy, RunId, TaskOutcome, TestName, WorkerAddr};

/// Outcome of a single test.
///
/// Serialized with the worker wire field names (`Name`, `Passing`, `Err`).
/// A missing diagnostic travels as an empty `Err` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(rename = "Name")]
    pub name: TestName,

    #[serde(rename = "Passing")]
    pub passing: bool,

    #[serde(rename = "Err", default, with = "empty_as_none")]
    pub diagnostic: Option<String>,
}

impl TestResult {
    /// A passing test.
    pub fn passed(name: TestName) -> Self {
        Self {
            name,
            passing: true,
            diagnostic: None,
        }
    }

    /// A failing test with its diagnostic output.
    pub fn failed(name: TestName, diagnostic: impl Into<String>) -> Self {
        Self {
            name,
            passing: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}

/// Category of a report error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Upload or extraction failed; fatal to the run.
    Artifact,
    /// Build failed; fatal to testing of that artifact.
    Build,
    /// One worker failed its chunk; siblings are unaffected.
    Dispatch,
    /// Informational, such as the local fallback notice.
    Info,
}

/// An error entry in a report. Distinct from failing tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    pub kind: ErrorKind,
    pub name: String,
    pub details: String,
}

impl ReportError {
    pub fn new(kind: ErrorKind, name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            details: details.into(),
        }
    }

    pub fn artifact(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Artifact, name, details)
    }

    pub fn build(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Build, "Failed build", details)
    }

    /// A worker failed to run its chunk. The chunk's tests are listed so
    /// they stay accounted for in the report.
    pub fn dispatch(worker: &WorkerAddr, reason: impl std::fmt::Display, tests: &[TestName]) -> Self {
        let names: Vec<&str> = tests.iter().map(TestName::as_str).collect();
        Self::new(
            ErrorKind::Dispatch,
            format!("Failed to run tests on {worker}"),
            format!("{reason} (tests: {})", names.join(", ")),
        )
    }

    pub fn info(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Info, name, details)
    }
}

/// Build and test outcome for one uploaded artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Artifact file name.
    pub name: String,

    /// Whether the build succeeded.
    pub passing_build: bool,

    /// Build diagnostic output (stderr).
    pub build_message: String,

    /// Distribution and build errors, in the order they were recorded.
    pub errors: Vec<ReportError>,

    /// Accumulated test results. Order across chunks is unspecified.
    pub tests: Vec<TestResult>,

    /// Final state of the task.
    pub outcome: TaskOutcome,

    /// How tests were executed, once decided.
    pub strategy: Option<ExecutionStrategy>,
}

impl TaskReport {
    /// Create a report for a freshly built artifact.
    pub fn new(name: impl Into<String>, build_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passing_build: true,
            build_message: build_message.into(),
            errors: Vec::new(),
            tests: Vec::new(),
            outcome: TaskOutcome::Pending,
            strategy: None,
        }
    }

    /// Mark the build as failed, recording its diagnostic.
    pub fn fail_build(&mut self) {
        self.passing_build = false;
        self.outcome = TaskOutcome::BuildFailed;
        self.errors.push(ReportError::build(self.build_message.clone()));
    }

    /// Append results returned by one chunk.
    pub fn record_results(&mut self, results: impl IntoIterator<Item = TestResult>) {
        self.tests.extend(results);
    }

    /// Append an error entry.
    pub fn record_error(&mut self, error: ReportError) {
        self.errors.push(error);
    }

    /// Number of passing tests.
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passing).count()
    }

    /// Number of failing tests.
    pub fn failed(&self) -> usize {
        self.tests.len() - self.passed()
    }

    /// Errors of the given kind.
    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &ReportError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

/// Top-level result of a coordinator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,

    /// Artifact file name, or a placeholder when the upload failed.
    pub title: String,

    pub tasks: Vec<TaskReport>,

    /// Run-level errors, such as upload failures or the local fallback notice.
    pub errors: Vec<ReportError>,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// Title used until the artifact name is known.
    pub const UNNAMED_TITLE: &'static str = "File name error";

    pub fn new() -> Self {
        Self {
            run_id: RunId::generate(),
            title: Self::UNNAMED_TITLE.to_string(),
            tasks: Vec::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Record a run-level error.
    pub fn record_error(&mut self, error: ReportError) {
        self.errors.push(error);
    }

    /// Stamp the finish time.
    pub fn finalize(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns true once the run has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Total number of test results across all tasks.
    pub fn total_tests(&self) -> usize {
        self.tasks.iter().map(|t| t.tests.len()).sum()
    }

    /// True if every task built, every test passed, and nothing failed to
    /// dispatch. Informational entries do not count against success.
    pub fn is_success(&self) -> bool {
        let run_errors = self.errors.iter().any(|e| e.kind != ErrorKind::Info);
        let task_errors = self
            .tasks
            .iter()
            .any(|t| !t.passing_build || t.failed() > 0 || t.errors.iter().any(|e| e.kind != ErrorKind::Info));

        !self.tasks.is_empty() && !run_errors && !task_errors
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
