//! Run orchestration.
//!
//! A run takes one uploaded archive through
//! `ReceivingArtifact → ExtractingSources → Building → SelectingStrategy →
//! LocalRun | RemoteRun → Finalized` and always ends with a populated
//! [`RunReport`]. Failures are recorded in the report, never returned.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use testrun_core::{
    partition, Chunk, ErrorKind, ExecutionStrategy, ReportError, RunReport, RunStage, TaskOutcome,
    TaskReport, TestName, WorkerAddr, WorkerProbe,
};
use testrun_runner::{run_all, BuildOutput, Toolchain, UploadDir};

use crate::config::Config;
use crate::dispatch::dispatch;
use crate::error::{DispatchError, RunError};
use crate::prober::Prober;
use crate::registry::WorkerRegistry;
use crate::transport::{Artifact, WorkerTransport};

const NO_WORKERS: &str = "No active workers, falling back to local execution";
const NO_WORKERS_HINT: &str = "Register workers with POST /v1/workers";
const NO_TESTS: &str = "No tests discovered";

/// An archive that has already been unpacked on disk.
#[derive(Debug, Clone)]
pub struct ExtractedArtifact {
    /// The archive as uploaded; forwarded verbatim to workers.
    pub archive: Artifact,

    /// Directory holding the extracted sources.
    pub source_dir: PathBuf,

    /// `.rs` files found in the archive, relative to `source_dir`.
    pub source_files: Vec<PathBuf>,
}

/// Tracks the stage of one run and owns its report until it is finalized.
struct RunTracker {
    stage: RunStage,
    report: RunReport,
}

impl RunTracker {
    fn start() -> Self {
        let report = RunReport::new();
        info!(run_id = %report.run_id, "Run started");
        Self {
            stage: RunStage::default(),
            report,
        }
    }

    fn advance(&mut self, next: RunStage) {
        info!(run_id = %self.report.run_id, from = ?self.stage, to = ?next, "Run stage changed");
        self.stage = next;
    }

    fn finish(mut self) -> RunReport {
        self.advance(RunStage::Finalized);
        self.report.finalize();
        info!(
            run_id = %self.report.run_id,
            tests = self.report.total_tests(),
            success = self.report.is_success(),
            "Run finalized"
        );
        self.report
    }
}

/// Splits test runs across active workers, or runs them locally when none
/// is reachable.
pub struct Coordinator {
    registry: Arc<WorkerRegistry>,
    prober: Prober,
    transport: Arc<dyn WorkerTransport>,
    toolchain: Arc<dyn Toolchain>,
    uploads_dir: PathBuf,
    dispatch_timeout: Duration,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Create a coordinator. `cancel` aborts in-flight dispatches when fired.
    pub fn new(
        registry: Arc<WorkerRegistry>,
        transport: Arc<dyn WorkerTransport>,
        toolchain: Arc<dyn Toolchain>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            prober: Prober::new(Arc::clone(&transport), config.probe_timeout),
            transport,
            toolchain,
            uploads_dir: config.uploads_dir.clone(),
            dispatch_timeout: config.dispatch_timeout,
            cancel,
        }
    }

    /// Registered workers.
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Probe every registered worker.
    pub async fn probe_workers(&self) -> Vec<WorkerProbe> {
        self.prober.probe(&self.registry).await
    }

    /// Run an uploaded archive end to end.
    ///
    /// `upload` carries the failure if the archive could not be received.
    pub async fn run(&self, upload: Result<Artifact, RunError>) -> RunReport {
        let mut tracker = RunTracker::start();

        let artifact = match upload {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(run_id = %tracker.report.run_id, error = %e, "Failed to receive upload");
                tracker.report.record_error(ReportError::artifact("Failed upload", e.to_string()));
                return tracker.finish();
            }
        };
        tracker.report.title = artifact.file_name.clone();

        let upload_dir =
            match UploadDir::create(&self.uploads_dir, &artifact.file_name, &artifact.bytes).await {
                Ok(dir) => dir,
                Err(e) => {
                    warn!(run_id = %tracker.report.run_id, error = %e, "Failed to store upload");
                    tracker.report.record_error(ReportError::artifact("Failed upload", e.to_string()));
                    return tracker.finish();
                }
            };

        tracker.advance(RunStage::ExtractingSources);
        let source_files = match upload_dir.extract().await {
            Ok(files) => files,
            Err(e) => {
                warn!(run_id = %tracker.report.run_id, error = %e, "Failed to extract upload");
                tracker.report.record_error(ReportError::artifact("Failed extract", e.to_string()));
                return tracker.finish();
            }
        };

        let extracted = ExtractedArtifact {
            archive: artifact,
            source_dir: upload_dir.path().to_path_buf(),
            source_files,
        };
        // `upload_dir` removes the sources when dropped, after the run.
        self.build_and_test(tracker, &extracted).await
    }

    /// Run an archive whose sources are already on disk.
    pub async fn run_extracted(&self, extracted: &ExtractedArtifact) -> RunReport {
        let mut tracker = RunTracker::start();
        tracker.report.title = extracted.archive.file_name.clone();
        self.build_and_test(tracker, extracted).await
    }

    async fn build_and_test(&self, mut tracker: RunTracker, extracted: &ExtractedArtifact) -> RunReport {
        tracker.advance(RunStage::Building);
        let source_dir = extracted.source_dir.as_path();

        let build = self.toolchain.build(source_dir).await.unwrap_or_else(|e| {
            error!(run_id = %tracker.report.run_id, error = %e, "Build could not be started");
            BuildOutput {
                success: false,
                diagnostic: e.to_string(),
            }
        });

        let mut task = TaskReport::new(extracted.archive.file_name.clone(), build.diagnostic);
        if !build.success {
            info!(run_id = %tracker.report.run_id, "Build failed");
            task.fail_build();
            tracker.report.tasks.push(task);
            return tracker.finish();
        }

        let tests = self.toolchain.discover(source_dir, &extracted.source_files).await;
        if tests.is_empty() {
            info!(run_id = %tracker.report.run_id, files = extracted.source_files.len(), "No tests discovered");
            task.outcome = TaskOutcome::NoTestsDiscovered;
            task.record_error(ReportError::info(
                NO_TESTS,
                format!("No #[test] functions in {} source files", extracted.source_files.len()),
            ));
            tracker.report.tasks.push(task);
            return tracker.finish();
        }

        tracker.advance(RunStage::SelectingStrategy);
        let active = self.prober.active_workers(&self.registry).await;

        if active.is_empty() {
            tracker.report.record_error(ReportError::info(NO_WORKERS, NO_WORKERS_HINT));
            tracker.advance(RunStage::LocalRun);
            task.strategy = Some(ExecutionStrategy::Local);
            task.record_results(run_all(self.toolchain.as_ref(), &tests, source_dir).await);
        } else {
            tracker.advance(RunStage::RemoteRun);
            task.strategy = Some(ExecutionStrategy::Remote);
            task = self.run_remote(task, &active, &tests, &extracted.archive).await;
        }

        task.outcome = TaskOutcome::Tested;
        tracker.report.tasks.push(task);
        tracker.finish()
    }

    /// Fan chunks out to `workers`, one concurrent unit per chunk, and fold
    /// every unit's outcome into `task`.
    async fn run_remote(
        &self,
        mut task: TaskReport,
        workers: &[WorkerAddr],
        tests: &[TestName],
        artifact: &Artifact,
    ) -> TaskReport {
        let chunks = match partition(tests, workers.len()) {
            Ok(chunks) => chunks,
            Err(e) => {
                error!(error = %e, "Failed to partition tests");
                task.record_error(ReportError::new(ErrorKind::Dispatch, "Failed to partition tests", e.to_string()));
                return task;
            }
        };
        info!(workers = workers.len(), chunks = chunks.len(), tests = tests.len(), "Distributing tests");

        let shared = Arc::new(Mutex::new(task));
        let mut units = JoinSet::new();
        let assignments: Vec<(WorkerAddr, Chunk)> = workers.iter().cloned().zip(chunks).collect();

        for (index, (worker, chunk)) in assignments.iter().cloned().enumerate() {
            let shared = Arc::clone(&shared);
            let transport = Arc::clone(&self.transport);
            let artifact = artifact.clone();
            let cancel = self.cancel.clone();
            let timeout = self.dispatch_timeout;

            units.spawn(async move {
                let outcome = AssertUnwindSafe(dispatch(
                    transport.as_ref(),
                    &worker,
                    &artifact,
                    &chunk,
                    timeout,
                    &cancel,
                ))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(DispatchError::Aborted(panic_message(&*panic))));

                let mut task = shared.lock().await;
                match outcome {
                    Ok(results) => task.record_results(results),
                    Err(e) => task.record_error(ReportError::dispatch(&worker, &e, chunk.tests())),
                }
                index
            });
        }

        let mut settled = vec![false; assignments.len()];
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(index) => settled[index] = true,
                Err(e) => error!(error = %e, "Dispatch unit did not complete"),
            }
        }

        record_unsettled(&mut *shared.lock().await, &assignments, &settled);

        match Arc::try_unwrap(shared) {
            Ok(task) => task.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        }
    }
}

/// Record a dispatch error for every chunk whose unit never settled, so its
/// tests stay accounted for.
fn record_unsettled(task: &mut TaskReport, assignments: &[(WorkerAddr, Chunk)], settled: &[bool]) {
    for ((worker, chunk), _) in assignments.iter().zip(settled).filter(|(_, done)| !**done) {
        let reason = DispatchError::Aborted("dispatch unit did not complete".to_string());
        task.record_error(ReportError::dispatch(worker, &reason, chunk.tests()));
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "dispatch unit panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use testrun_core::TestResult;
    use testrun_runner::RunnerError;

    use super::*;

    #[derive(Clone, Copy)]
    enum Behavior {
        Healthy,
        Down,
        Hang,
        Reject,
        Panic,
    }

    /// Workers keyed by address; unknown addresses are down.
    #[derive(Default)]
    struct FakeTransport {
        workers: HashMap<WorkerAddr, Behavior>,
        dispatched: std::sync::Mutex<Vec<(WorkerAddr, Vec<TestName>)>>,
    }

    impl FakeTransport {
        fn with(workers: &[(&str, Behavior)]) -> Self {
            Self {
                workers: workers
                    .iter()
                    .map(|(addr, b)| (WorkerAddr::parse(addr).unwrap(), *b))
                    .collect(),
                ..Default::default()
            }
        }

        fn behavior(&self, worker: &WorkerAddr) -> Behavior {
            self.workers.get(worker).copied().unwrap_or(Behavior::Down)
        }

        fn dispatched(&self) -> Vec<(WorkerAddr, Vec<TestName>)> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WorkerTransport for FakeTransport {
        async fn ping(&self, worker: &WorkerAddr) -> Result<(), DispatchError> {
            match self.behavior(worker) {
                Behavior::Down => Err(DispatchError::Transport("connection refused".to_string())),
                _ => Ok(()),
            }
        }

        async fn run_chunk(
            &self,
            worker: &WorkerAddr,
            _artifact: &Artifact,
            chunk: &Chunk,
        ) -> Result<Vec<TestResult>, DispatchError> {
            self.dispatched
                .lock()
                .unwrap()
                .push((worker.clone(), chunk.tests().to_vec()));

            match self.behavior(worker) {
                Behavior::Healthy => Ok(chunk.tests().iter().cloned().map(TestResult::passed).collect()),
                Behavior::Down => Err(DispatchError::Transport("connection refused".to_string())),
                Behavior::Hang => std::future::pending().await,
                Behavior::Reject => Err(DispatchError::Rejected {
                    status: 400,
                    body: "Failed extract: zip: not a valid zip file".to_string(),
                }),
                Behavior::Panic => panic!("worker exploded"),
            }
        }
    }

    /// Builds when `builds` is set and discovers a fixed list of tests.
    struct FakeToolchain {
        builds: bool,
        tests: Vec<TestName>,
        local_runs: AtomicUsize,
    }

    impl FakeToolchain {
        fn new(builds: bool, test_count: usize) -> Self {
            Self {
                builds,
                tests: (1..=test_count).map(|i| TestName::new(format!("test_{i}"))).collect(),
                local_runs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Toolchain for FakeToolchain {
        async fn build(&self, _source_dir: &Path) -> Result<BuildOutput, RunnerError> {
            Ok(BuildOutput {
                success: self.builds,
                diagnostic: if self.builds {
                    String::new()
                } else {
                    "error[E0425]: cannot find value `x` in this scope".to_string()
                },
            })
        }

        async fn run_one(&self, _source_dir: &Path, test: &TestName) -> Result<TestResult, RunnerError> {
            self.local_runs.fetch_add(1, Ordering::SeqCst);
            Ok(TestResult::passed(test.clone()))
        }

        async fn discover(&self, _source_dir: &Path, _source_files: &[PathBuf]) -> Vec<TestName> {
            self.tests.clone()
        }
    }

    struct Harness {
        coordinator: Coordinator,
        transport: Arc<FakeTransport>,
        toolchain: Arc<FakeToolchain>,
        cancel: CancellationToken,
    }

    fn harness(workers: &[(&str, Behavior)], toolchain: FakeToolchain) -> Harness {
        let transport = Arc::new(FakeTransport::with(workers));
        let toolchain = Arc::new(toolchain);
        let registry = Arc::new(WorkerRegistry::with_workers(
            workers.iter().map(|(addr, _)| WorkerAddr::parse(addr).unwrap()),
        ));
        let config = Config {
            dispatch_timeout: Duration::from_secs(10),
            ..Config::default()
        };
        let cancel = CancellationToken::new();

        let coordinator = Coordinator::new(
            registry,
            transport.clone(),
            toolchain.clone(),
            &config,
            cancel.clone(),
        );
        Harness {
            coordinator,
            transport,
            toolchain,
            cancel,
        }
    }

    fn extracted() -> ExtractedArtifact {
        ExtractedArtifact {
            archive: Artifact::new("project.zip", vec![0u8; 16]),
            source_dir: PathBuf::from("/nonexistent"),
            source_files: vec![PathBuf::from("src/lib.rs")],
        }
    }

    fn sorted_names(task: &TaskReport) -> Vec<String> {
        let mut names: Vec<String> = task.tests.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_three_workers_split_six_tests() {
        let h = harness(
            &[("w1:1", Behavior::Healthy), ("w2:1", Behavior::Healthy), ("w3:1", Behavior::Healthy)],
            FakeToolchain::new(true, 6),
        );

        let report = h.coordinator.run_extracted(&extracted()).await;

        assert!(report.is_finalized());
        assert!(report.errors.is_empty());
        let task = &report.tasks[0];
        assert_eq!(task.outcome, TaskOutcome::Tested);
        assert_eq!(task.strategy, Some(ExecutionStrategy::Remote));
        assert!(task.errors.is_empty());
        assert_eq!(task.tests.len(), 6);
        assert!(report.is_success());

        let mut dispatched = h.transport.dispatched();
        dispatched.sort();
        assert_eq!(dispatched.len(), 3);
        assert!(dispatched.iter().all(|(_, chunk)| chunk.len() == 2));
        assert_eq!(dispatched[0].1, vec![TestName::from("test_1"), TestName::from("test_2")]);
        assert_eq!(h.toolchain.local_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_workers_falls_back_to_local() {
        let h = harness(&[], FakeToolchain::new(true, 6));

        let report = h.coordinator.run_extracted(&extracted()).await;

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::Info);
        assert_eq!(report.errors[0].name, NO_WORKERS);

        let task = &report.tasks[0];
        assert_eq!(task.strategy, Some(ExecutionStrategy::Local));
        assert_eq!(
            sorted_names(task),
            vec!["test_1", "test_2", "test_3", "test_4", "test_5", "test_6"]
        );
        assert_eq!(h.toolchain.local_runs.load(Ordering::SeqCst), 6);
        assert!(h.transport.dispatched().is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_all_workers_dead_falls_back_to_local() {
        let h = harness(&[("w1:1", Behavior::Down), ("w2:1", Behavior::Down)], FakeToolchain::new(true, 3));

        let report = h.coordinator.run_extracted(&extracted()).await;

        assert_eq!(report.tasks[0].strategy, Some(ExecutionStrategy::Local));
        assert_eq!(report.tasks[0].tests.len(), 3);
        assert!(h.transport.dispatched().is_empty());
        // Dead workers stay registered for the next run.
        assert_eq!(h.coordinator.registry().len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_worker_times_out_without_losing_sibling() {
        let h = harness(&[("w1:1", Behavior::Healthy), ("w2:1", Behavior::Hang)], FakeToolchain::new(true, 6));

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        assert_eq!(sorted_names(task), vec!["test_1", "test_2", "test_3"]);
        assert_eq!(task.errors.len(), 1);

        let error = &task.errors[0];
        assert_eq!(error.kind, ErrorKind::Dispatch);
        assert_eq!(error.name, "Failed to run tests on http://w2:1");
        assert!(error.details.contains("timed out"));
        assert!(error.details.contains("test_4, test_5, test_6"));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_rejected_chunk_is_isolated() {
        let h = harness(
            &[("w1:1", Behavior::Healthy), ("w2:1", Behavior::Reject), ("w3:1", Behavior::Healthy)],
            FakeToolchain::new(true, 5),
        );

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        // Chunks of 2, 2, 1: the middle one is lost.
        assert_eq!(sorted_names(task), vec!["test_1", "test_2", "test_5"]);
        let dispatch_errors: Vec<_> = task.errors_of(ErrorKind::Dispatch).collect();
        assert_eq!(dispatch_errors.len(), 1);
        assert_eq!(dispatch_errors[0].name, "Failed to run tests on http://w2:1");
        assert!(dispatch_errors[0].details.contains("worker responded 400"));
    }

    #[tokio::test]
    async fn test_panicking_unit_becomes_dispatch_error() {
        let h = harness(&[("w1:1", Behavior::Panic), ("w2:1", Behavior::Healthy)], FakeToolchain::new(true, 4));

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        assert_eq!(sorted_names(task), vec!["test_3", "test_4"]);
        assert_eq!(task.errors.len(), 1);
        assert!(task.errors[0].details.contains("worker exploded"));
    }

    #[test]
    fn test_unsettled_units_keep_their_chunks() {
        let assignments = vec![
            (WorkerAddr::parse("w1:1").unwrap(), Chunk::new(vec![TestName::from("test_1")])),
            (WorkerAddr::parse("w2:1").unwrap(), Chunk::new(vec![TestName::from("test_2"), TestName::from("test_3")])),
        ];
        let mut task = TaskReport::new("project.zip", "");

        record_unsettled(&mut task, &assignments, &[true, false]);

        assert_eq!(task.errors.len(), 1);
        assert_eq!(task.errors[0].kind, ErrorKind::Dispatch);
        assert_eq!(task.errors[0].name, "Failed to run tests on http://w2:1");
        assert!(task.errors[0].details.contains("did not complete"));
        assert!(task.errors[0].details.contains("test_2, test_3"));

        let mut clean = TaskReport::new("project.zip", "");
        record_unsettled(&mut clean, &assignments, &[true, true]);
        assert!(clean.errors.is_empty());
    }

    #[tokio::test]
    async fn test_fewer_tests_than_workers() {
        let h = harness(
            &[("w1:1", Behavior::Healthy), ("w2:1", Behavior::Healthy), ("w3:1", Behavior::Healthy)],
            FakeToolchain::new(true, 2),
        );

        let report = h.coordinator.run_extracted(&extracted()).await;

        assert_eq!(report.tasks[0].tests.len(), 2);
        assert_eq!(h.transport.dispatched().len(), 2);
    }

    #[tokio::test]
    async fn test_build_failure_skips_tests() {
        let h = harness(&[("w1:1", Behavior::Healthy)], FakeToolchain::new(false, 6));

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        assert!(!task.passing_build);
        assert_eq!(task.outcome, TaskOutcome::BuildFailed);
        assert!(task.tests.is_empty());
        assert_eq!(task.errors.len(), 1);
        assert_eq!(task.errors[0].kind, ErrorKind::Build);
        assert!(task.errors[0].details.contains("E0425"));
        assert!(h.transport.dispatched().is_empty());
        assert_eq!(h.toolchain.local_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_discovery() {
        let h = harness(&[("w1:1", Behavior::Healthy)], FakeToolchain::new(true, 0));

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        assert_eq!(task.outcome, TaskOutcome::NoTestsDiscovered);
        assert_eq!(task.strategy, None);
        assert_eq!(task.errors[0].name, NO_TESTS);
        assert!(h.transport.dispatched().is_empty());
        assert!(report.is_finalized());
    }

    #[tokio::test]
    async fn test_cancelled_run_reports_every_chunk() {
        let h = harness(&[("w1:1", Behavior::Hang), ("w2:1", Behavior::Hang)], FakeToolchain::new(true, 4));
        h.cancel.cancel();

        let report = h.coordinator.run_extracted(&extracted()).await;

        let task = &report.tasks[0];
        assert!(task.tests.is_empty());
        assert_eq!(task.errors.len(), 2);
        assert!(task.errors.iter().all(|e| e.details.starts_with("cancelled")));
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported() {
        let h = harness(&[], FakeToolchain::new(true, 1));

        let report = h.coordinator.run(Err(RunError::MissingField("codeZip"))).await;

        assert!(report.is_finalized());
        assert!(report.tasks.is_empty());
        assert_eq!(report.title, RunReport::UNNAMED_TITLE);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::Artifact);
        assert_eq!(report.errors[0].name, "Failed upload");
    }

    #[tokio::test]
    async fn test_unreadable_archive_is_reported() {
        let uploads = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default());
        let config = Config {
            uploads_dir: uploads.path().to_path_buf(),
            ..Config::default()
        };
        let coordinator = Coordinator::new(
            Arc::new(WorkerRegistry::new()),
            transport,
            Arc::new(FakeToolchain::new(true, 1)),
            &config,
            CancellationToken::new(),
        );

        let report = coordinator
            .run(Ok(Artifact::new("broken.zip", b"not a zip".to_vec())))
            .await;

        assert_eq!(report.title, "broken.zip");
        assert!(report.tasks.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].name, "Failed extract");
        // The upload directory is gone once the run is over.
        assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
    }
}
