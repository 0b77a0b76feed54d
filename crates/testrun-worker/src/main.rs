//! TestRun Worker Daemon

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use testrun_worker::{http, Config, WorkerState};

/// TestRun worker: runs the test chunks a coordinator sends it.
#[derive(Parser, Debug)]
#[command(name = "testrun-worker", about = "TestRun worker daemon")]
struct Args {
    /// HTTP server address
    #[arg(long, env = "TESTRUN_WORKER_BIND", default_value = "127.0.0.1:8081")]
    bind: String,

    /// Directory for received archives (cleaned at startup)
    #[arg(long, env = "TESTRUN_WORKER_UPLOADS", default_value = "worker-uploads")]
    uploads_dir: PathBuf,

    /// Path to the cargo executable
    #[arg(long, env = "TESTRUN_CARGO", default_value = "cargo")]
    cargo: String,

    /// Timeout for a single test in seconds
    #[arg(long, default_value = "60")]
    test_timeout_secs: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind,
            uploads_dir: args.uploads_dir,
            cargo_path: args.cargo,
            test_timeout: Duration::from_secs(args.test_timeout_secs),
            ..Config::default()
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from(Args::parse());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let addr: SocketAddr = config.bind_addr.parse()?;
    testrun_runner::init_workspace(&config.uploads_dir).await?;

    info!(addr = %addr, cargo = %config.cargo_path, "Starting TestRun worker");
    let router = http::create_router(WorkerState::new(config));

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("TestRun worker stopped");
    Ok(())
}
