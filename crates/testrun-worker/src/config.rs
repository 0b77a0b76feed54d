//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub bind_addr: String,

    /// Root directory for received archives.
    pub uploads_dir: PathBuf,

    /// Path to the cargo executable.
    pub cargo_path: String,

    /// Upper bound for a single test invocation.
    pub test_timeout: Duration,

    /// Upper bound for handling one inbound request.
    pub request_timeout: Duration,

    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8081".to_string(),
            uploads_dir: PathBuf::from("worker-uploads"),
            cargo_path: "cargo".to_string(),
            test_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(300),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}
