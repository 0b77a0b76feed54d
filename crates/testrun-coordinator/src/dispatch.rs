//! Remote dispatch of one chunk to one worker.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use testrun_core::{Chunk, TestResult, WorkerAddr};

use crate::error::DispatchError;
use crate::transport::{Artifact, WorkerTransport};

/// Send `chunk` to `worker` and wait for its results.
///
/// The request is abandoned when `timeout` elapses or `cancel` fires; both
/// surface as errors like any transport failure. Results are never partially
/// merged: either the worker's whole answer is returned or an error is.
pub async fn dispatch(
    transport: &dyn WorkerTransport,
    worker: &WorkerAddr,
    artifact: &Artifact,
    chunk: &Chunk,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<TestResult>, DispatchError> {
    info!(worker = %worker, tests = chunk.len(), "Dispatching chunk");

    let result = tokio::select! {
        _ = cancel.cancelled() => Err(DispatchError::Cancelled),
        outcome = tokio::time::timeout(timeout, transport.run_chunk(worker, artifact, chunk)) => {
            outcome.unwrap_or(Err(DispatchError::Timeout(timeout)))
        }
    };

    match &result {
        Ok(results) => info!(worker = %worker, results = results.len(), "Chunk completed"),
        Err(e) => warn!(worker = %worker, error = %e, "Chunk failed"),
    }
    result
}
