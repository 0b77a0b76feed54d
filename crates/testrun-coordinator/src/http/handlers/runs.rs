//! Test run handler.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use testrun_core::protocol::FIELD_CODE_ZIP;
use testrun_core::RunReport;

use crate::error::RunError;
use crate::state::AppState;
use crate::transport::Artifact;

/// Run an uploaded archive.
///
/// Always answers 200 with a report; upload problems are recorded in it.
pub async fn submit_run(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<RunReport> {
    let upload = match multipart {
        Ok(multipart) => read_artifact(multipart).await,
        Err(rejection) => Err(RunError::from(rejection)),
    };

    let report = state.coordinator.run(upload).await;
    state.metrics.record(&report);
    Json(report)
}

async fn read_artifact(mut multipart: Multipart) -> Result<Artifact, RunError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FIELD_CODE_ZIP) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(RunError::MissingFileName)?;
        let bytes = field.bytes().await?;

        info!(file = %file_name, bytes = bytes.len(), "Received upload");
        return Ok(Artifact::new(file_name, bytes.to_vec()));
    }

    Err(RunError::MissingField(FIELD_CODE_ZIP))
}
