//! Worker registration and status handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use testrun_core::WorkerAddr;

use crate::http::responses::{ErrorResponse, RegisterWorkerRequest, WorkerResponse};
use crate::state::AppState;

/// Probe every registered worker and return its status.
pub async fn list_workers(State(state): State<Arc<AppState>>) -> Json<Vec<WorkerResponse>> {
    Json(probe_all(&state).await)
}

/// Register a worker, then return the status of every worker.
///
/// Answers 201 for a new worker and 200 if it was already registered.
pub async fn register_worker(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterWorkerRequest>,
) -> Response {
    let addr = match WorkerAddr::parse(&req.remote) {
        Ok(addr) => addr,
        Err(e) => {
            warn!(remote = %req.remote, error = %e, "Rejected worker registration");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let added = state.coordinator.registry().register(addr).await;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(probe_all(&state).await)).into_response()
}

async fn probe_all(state: &AppState) -> Vec<WorkerResponse> {
    state
        .coordinator
        .probe_workers()
        .await
        .into_iter()
        .map(WorkerResponse::from)
        .collect()
}
