//! Local executor: runs tests one by one on this machine.
//!
//! Used by workers for their assigned chunk and by the coordinator when no
//! worker is reachable.

use std::path::Path;

use tracing::{info, warn};

use testrun_core::{TestName, TestResult};

use crate::toolchain::Toolchain;

/// Run every test once, sequentially, in the given order.
///
/// A test the toolchain fails to run is reported as a failing result with
/// the error as its diagnostic; it never stops the remaining tests.
pub async fn run_all(
    toolchain: &dyn Toolchain,
    tests: &[TestName],
    source_dir: &Path,
) -> Vec<TestResult> {
    info!(source_dir = %source_dir.display(), count = tests.len(), "Running tests locally");

    let mut results = Vec::with_capacity(tests.len());
    for test in tests {
        let result = match toolchain.run_one(source_dir, test).await {
            Ok(result) => result,
            Err(e) => {
                warn!(test = %test, error = %e, "Failed to run test");
                TestResult::failed(
                    test.clone(),
                    format!("Failed to run {test} with err: {e}"),
                )
            }
        };
        results.push(result);
    }

    results
}
