//! Coordinator configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub bind_addr: String,

    /// Root directory for uploaded archives.
    pub uploads_dir: PathBuf,

    /// Workers registered at startup.
    pub workers: Vec<String>,

    /// Path to the cargo executable used for builds and local runs.
    pub cargo_path: String,

    /// Upper bound for one worker ping.
    pub probe_timeout: Duration,

    /// Upper bound for one chunk dispatch, including the worker's test run.
    pub dispatch_timeout: Duration,

    /// Upper bound for `cargo build` of an uploaded project.
    pub build_timeout: Duration,

    /// Upper bound for one local `cargo test` invocation.
    pub test_timeout: Duration,

    /// Upper bound for handling one inbound request other than a run.
    /// `POST /test` is not bounded by it; a run always returns its report.
    pub request_timeout: Duration,

    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            uploads_dir: PathBuf::from("uploads"),
            workers: Vec::new(),
            cargo_path: "cargo".to_string(),
            probe_timeout: Duration::from_secs(5),
            dispatch_timeout: Duration::from_secs(120),
            build_timeout: Duration::from_secs(600),
            test_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}
