//! HTTP client for the coordinator REST endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use testrun_core::protocol::{ENDPOINT_TEST, FIELD_CODE_ZIP};
use testrun_core::RunReport;

use crate::error::ClientError;

/// Worker status as reported by `/v1/workers`.
#[derive(Debug, Deserialize)]
pub struct WorkerStatusView {
    pub remote: String,
    pub status: String,
    pub error: Option<String>,
    pub checked_at: String,
}

/// HTTP client for the coordinator.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if the coordinator is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Upload a zipped project and wait for its report.
    pub async fn submit(&self, archive: &Path) -> Result<RunReport, ClientError> {
        let bytes = tokio::fs::read(archive).await.map_err(|source| ClientError::Archive {
            path: archive.display().to_string(),
            source,
        })?;
        let file_name = archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "code.zip".to_string());

        let url = format!("{}{}", self.base_url, ENDPOINT_TEST);
        debug!(url = %url, file = %file_name, bytes = bytes.len(), "Submitting archive");

        let form = Form::new().part(FIELD_CODE_ZIP, Part::bytes(bytes).file_name(file_name));
        let response = self.inner.post(&url).multipart(form).send().await?;
        decode(response).await
    }

    /// Register a worker and return the resulting worker statuses.
    pub async fn register_worker(&self, remote: &str) -> Result<Vec<WorkerStatusView>, ClientError> {
        let url = format!("{}/v1/workers", self.base_url);
        debug!(url = %url, remote = %remote, "Registering worker");

        let response = self
            .inner
            .post(&url)
            .json(&serde_json::json!({ "remote": remote }))
            .send()
            .await?;
        decode(response).await
    }

    /// Probe and list registered workers.
    pub async fn workers(&self) -> Result<Vec<WorkerStatusView>, ClientError> {
        self.get_json("/v1/workers").await
    }

    /// Get JSON from an endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self.inner.get(&url).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Serialization(e.to_string()))
}
