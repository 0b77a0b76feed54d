//! HTTP server for the coordinator.
//!
//! Provides endpoints for:
//! - Test runs (`POST /test`)
//! - Worker registration and status (`/v1/workers`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use testrun_core::protocol::ENDPOINT_TEST;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.request_timeout;
    let max_upload_bytes = state.config.max_upload_bytes;

    // Runs are bounded by the toolchain and dispatch timeouts instead, so a
    // slow run still answers with its report.
    let control: Router<Arc<AppState>> = Router::new()
        .route(
            "/v1/workers",
            get(handlers::list_workers).post(handlers::register_worker),
        )
        // Observability routes
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .route(ENDPOINT_TEST, post(handlers::submit_run))
        .merge(control)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
