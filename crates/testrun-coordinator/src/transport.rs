//! Worker transport.
//!
//! [`WorkerTransport`] is the only way the coordinator talks to workers.
//! [`HttpTransport`] speaks the worker HTTP protocol; tests plug in fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use testrun_core::protocol::{
    encode_test_list, ENDPOINT_PING, ENDPOINT_TEST, FIELD_CODE_ZIP, FIELD_TEST_LIST,
};
use testrun_core::{Chunk, TestResult, WorkerAddr};

use crate::error::DispatchError;

/// An uploaded source archive, shared by every dispatch of a run.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Original file name of the archive.
    pub file_name: String,

    /// Raw archive bytes.
    pub bytes: Arc<[u8]>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Request/response channel to workers.
#[async_trait]
pub trait WorkerTransport: Send + Sync {
    /// Lightweight reachability check.
    async fn ping(&self, worker: &WorkerAddr) -> Result<(), DispatchError>;

    /// Send `artifact` and `chunk` to `worker` and wait for its results.
    async fn run_chunk(
        &self,
        worker: &WorkerAddr,
        artifact: &Artifact,
        chunk: &Chunk,
    ) -> Result<Vec<TestResult>, DispatchError>;
}

/// HTTP implementation of [`WorkerTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose connections give up after `connect_timeout`.
    ///
    /// Whole-request deadlines are applied by the caller, so probes and
    /// dispatches can use different limits over the same client.
    pub fn new(connect_timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WorkerTransport for HttpTransport {
    async fn ping(&self, worker: &WorkerAddr) -> Result<(), DispatchError> {
        let url = worker.endpoint(ENDPOINT_PING);
        debug!(url = %url, "Pinging worker");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn run_chunk(
        &self,
        worker: &WorkerAddr,
        artifact: &Artifact,
        chunk: &Chunk,
    ) -> Result<Vec<TestResult>, DispatchError> {
        let url = worker.endpoint(ENDPOINT_TEST);
        debug!(url = %url, tests = chunk.len(), bytes = artifact.bytes.len(), "POST chunk");

        let archive = Part::bytes(artifact.bytes.to_vec()).file_name(artifact.file_name.clone());
        let form = Form::new()
            .text(FIELD_TEST_LIST, encode_test_list(chunk.tests()))
            .part(FIELD_CODE_ZIP, archive);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| DispatchError::Protocol(e.to_string()))
    }
}
