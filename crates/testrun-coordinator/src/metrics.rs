//! Prometheus metrics collection and formatting.
//!
//! Run counters are accumulated as reports are produced; the worker gauge
//! is read from the registry at scrape time.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use testrun_core::{ErrorKind, ExecutionStrategy, RunReport, TaskOutcome};

use crate::state::AppState;

/// Counters over every run the coordinator has finished.
#[derive(Debug, Default)]
pub struct RunMetrics {
    runs_passed: AtomicU64,
    runs_failed: AtomicU64,
    runs_build_failed: AtomicU64,
    runs_no_tests: AtomicU64,
    runs_artifact_error: AtomicU64,
    tests_passed: AtomicU64,
    tests_failed: AtomicU64,
    dispatch_errors: AtomicU64,
    local_fallbacks: AtomicU64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finalized report into the counters.
    pub fn record(&self, report: &RunReport) {
        let outcome = match report.tasks.first() {
            None => &self.runs_artifact_error,
            Some(task) if task.outcome == TaskOutcome::BuildFailed => &self.runs_build_failed,
            Some(task) if task.outcome == TaskOutcome::NoTestsDiscovered => &self.runs_no_tests,
            Some(_) if report.is_success() => &self.runs_passed,
            Some(_) => &self.runs_failed,
        };
        outcome.fetch_add(1, Ordering::Relaxed);

        for task in &report.tasks {
            self.tests_passed.fetch_add(task.passed() as u64, Ordering::Relaxed);
            self.tests_failed.fetch_add(task.failed() as u64, Ordering::Relaxed);
            self.dispatch_errors
                .fetch_add(task.errors_of(ErrorKind::Dispatch).count() as u64, Ordering::Relaxed);
            if task.strategy == Some(ExecutionStrategy::Local) {
                self.local_fallbacks.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Collect all metrics and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();

    collect_worker_metrics(state, &mut output).await;
    collect_run_metrics(&state.metrics, &mut output);

    output
}

async fn collect_worker_metrics(state: &Arc<AppState>, output: &mut String) {
    let registered = state.coordinator.registry().len().await;

    writeln!(
        output,
        "# HELP testrun_workers_registered Number of registered workers"
    )
    .ok();
    writeln!(output, "# TYPE testrun_workers_registered gauge").ok();
    writeln!(output, "testrun_workers_registered {registered}").ok();
}

fn collect_run_metrics(metrics: &RunMetrics, output: &mut String) {
    let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

    writeln!(output).ok();
    writeln!(output, "# HELP testrun_runs_total Finished runs by outcome").ok();
    writeln!(output, "# TYPE testrun_runs_total counter").ok();
    for (outcome, counter) in [
        ("passed", &metrics.runs_passed),
        ("failed", &metrics.runs_failed),
        ("build_failed", &metrics.runs_build_failed),
        ("no_tests", &metrics.runs_no_tests),
        ("artifact_error", &metrics.runs_artifact_error),
    ] {
        writeln!(output, "testrun_runs_total{{outcome=\"{outcome}\"}} {}", load(counter)).ok();
    }

    writeln!(output).ok();
    writeln!(output, "# HELP testrun_tests_total Test results by outcome").ok();
    writeln!(output, "# TYPE testrun_tests_total counter").ok();
    writeln!(output, "testrun_tests_total{{result=\"passed\"}} {}", load(&metrics.tests_passed)).ok();
    writeln!(output, "testrun_tests_total{{result=\"failed\"}} {}", load(&metrics.tests_failed)).ok();

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP testrun_dispatch_errors_total Chunks that failed to run on a worker"
    )
    .ok();
    writeln!(output, "# TYPE testrun_dispatch_errors_total counter").ok();
    writeln!(output, "testrun_dispatch_errors_total {}", load(&metrics.dispatch_errors)).ok();

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP testrun_local_fallbacks_total Runs executed locally for lack of workers"
    )
    .ok();
    writeln!(output, "# TYPE testrun_local_fallbacks_total counter").ok();
    writeln!(output, "testrun_local_fallbacks_total {}", load(&metrics.local_fallbacks)).ok();
}
