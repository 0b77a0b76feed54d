//! HTTP server for the worker.
//!
//! - `GET /ping`: liveness check, answers `OK`.
//! - `POST /test`: multipart `testList` + `codeZip`; runs the listed tests
//!   and answers a JSON array of results.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use testrun_core::protocol::{
    decode_test_list, ENDPOINT_PING, ENDPOINT_TEST, FIELD_CODE_ZIP, FIELD_TEST_LIST, PING_BODY,
};
use testrun_core::{TestName, TestResult};
use testrun_runner::{run_all, UploadDir};

use crate::error::WorkerError;
use crate::state::WorkerState;

/// Create the HTTP router.
pub fn create_router(state: Arc<WorkerState>) -> Router {
    let request_timeout = state.config.request_timeout;
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route(ENDPOINT_PING, get(ping))
        .route(ENDPOINT_TEST, post(run_tests))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping() -> &'static str {
    PING_BODY
}

/// A received chunk: the archive and the tests to run from it.
struct ChunkUpload {
    file_name: String,
    archive: Vec<u8>,
    tests: Vec<TestName>,
}

async fn run_tests(
    State(state): State<Arc<WorkerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<TestResult>>, WorkerError> {
    let upload = read_upload(multipart?).await?;

    let dir = UploadDir::create(&state.config.uploads_dir, &upload.file_name, &upload.archive)
        .await
        .map_err(WorkerError::Store)?;
    dir.extract().await.map_err(WorkerError::Extract)?;

    info!(file = %upload.file_name, tests = upload.tests.len(), "Running chunk");
    let results = run_all(state.toolchain.as_ref(), &upload.tests, dir.path()).await;

    let passed = results.iter().filter(|r| r.passing).count();
    info!(file = %upload.file_name, passed, failed = results.len() - passed, "Chunk finished");
    Ok(Json(results))
}

async fn read_upload(mut multipart: Multipart) -> Result<ChunkUpload, WorkerError> {
    let mut tests = Vec::new();
    let mut archive = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FIELD_TEST_LIST) => tests = decode_test_list(&field.text().await?),
            Some(FIELD_CODE_ZIP) => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .ok_or(WorkerError::MissingFileName)?;
                archive = Some((file_name, field.bytes().await?.to_vec()));
            }
            _ => {}
        }
    }

    let (file_name, archive) = archive.ok_or(WorkerError::MissingField(FIELD_CODE_ZIP))?;
    Ok(ChunkUpload {
        file_name,
        archive,
        tests,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use reqwest::multipart::{Form, Part};
    use reqwest::StatusCode;
    use tokio::net::TcpListener;

    use testrun_runner::{BuildOutput, RunnerError, Toolchain};

    use super::*;
    use crate::config::Config;

    /// Passes `pass_*` tests, fails the rest; records the directory it ran in.
    struct ScriptedToolchain;

    #[async_trait]
    impl Toolchain for ScriptedToolchain {
        async fn build(&self, _source_dir: &Path) -> Result<BuildOutput, RunnerError> {
            Ok(BuildOutput {
                success: true,
                diagnostic: String::new(),
            })
        }

        async fn run_one(&self, source_dir: &Path, test: &TestName) -> Result<TestResult, RunnerError> {
            if !source_dir.join("src/lib.rs").exists() {
                return Err(RunnerError::TestNotFound(test.to_string()));
            }
            if test.as_str().starts_with("pass_") {
                Ok(TestResult::passed(test.clone()))
            } else {
                Ok(TestResult::failed(test.clone(), "assertion failed"))
            }
        }
    }

    async fn spawn_worker() -> (String, tempfile::TempDir) {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            uploads_dir: uploads.path().to_path_buf(),
            ..Config::default()
        };
        let state = WorkerState::with_toolchain(config, Arc::new(ScriptedToolchain));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        (format!("http://{addr}"), uploads)
    }

    /// Zip archive holding one empty file, stored uncompressed.
    fn zip_with_empty_file(name: &str) -> Vec<u8> {
        let name = name.as_bytes();
        let name_len = name.len() as u16;
        let dos_date: u16 = (1 << 5) | 1;

        let mut zip = Vec::new();
        // Local file header.
        zip.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        for field in [10u16, 0, 0, 0, dos_date] {
            zip.extend_from_slice(&field.to_le_bytes());
        }
        zip.extend_from_slice(&[0u8; 12]); // crc, compressed and uncompressed size
        zip.extend_from_slice(&name_len.to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());
        zip.extend_from_slice(name);

        // Central directory.
        let cd_offset = zip.len() as u32;
        zip.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        for field in [20u16, 10, 0, 0, 0, dos_date] {
            zip.extend_from_slice(&field.to_le_bytes());
        }
        zip.extend_from_slice(&[0u8; 12]);
        for field in [name_len, 0, 0, 0, 0] {
            zip.extend_from_slice(&field.to_le_bytes());
        }
        zip.extend_from_slice(&0u32.to_le_bytes()); // external attributes
        zip.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        zip.extend_from_slice(name);
        let cd_size = zip.len() as u32 - cd_offset;

        // End of central directory.
        zip.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        for field in [0u16, 0, 1, 1] {
            zip.extend_from_slice(&field.to_le_bytes());
        }
        zip.extend_from_slice(&cd_size.to_le_bytes());
        zip.extend_from_slice(&cd_offset.to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes());
        zip
    }

    fn unzip_available() -> bool {
        std::process::Command::new("unzip").arg("-v").output().is_ok()
    }

    #[tokio::test]
    async fn test_ping() {
        let (base, _uploads) = spawn_worker().await;
        let response = reqwest::get(format!("{base}/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "OK");
    }

    #[tokio::test]
    async fn test_runs_listed_tests() {
        if !unzip_available() {
            eprintln!("unzip not installed, skipping");
            return;
        }
        let (base, uploads) = spawn_worker().await;

        let archive = Part::bytes(zip_with_empty_file("src/lib.rs")).file_name("code.zip");
        let form = Form::new()
            .text("testList", "pass_a,fail_b, pass_c")
            .part("codeZip", archive);
        let response = reqwest::Client::new()
            .post(format!("{base}/test"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let results: Vec<TestResult> = response.json().await.unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["pass_a", "fail_b", "pass_c"]);
        assert!(results[0].passing && !results[1].passing && results[2].passing);
        assert_eq!(results[1].diagnostic.as_deref(), Some("assertion failed"));

        // The chunk's upload directory is cleaned up after the response.
        assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_archive_is_bad_request() {
        let (base, _uploads) = spawn_worker().await;

        let form = Form::new().text("testList", "pass_a");
        let response = reqwest::Client::new()
            .post(format!("{base}/test"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text().await.unwrap(), "Missing form field 'codeZip'");
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_failed_extract() {
        let (base, _uploads) = spawn_worker().await;

        let archive = Part::bytes(b"not a zip".to_vec()).file_name("code.zip");
        let form = Form::new().text("testList", "pass_a").part("codeZip", archive);
        let response = reqwest::Client::new()
            .post(format!("{base}/test"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.text().await.unwrap().starts_with("Failed extract: "));
    }
}
