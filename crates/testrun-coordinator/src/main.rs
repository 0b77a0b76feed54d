//! TestRun Coordinator Server

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use testrun_coordinator::shutdown::install_shutdown_handler;
use testrun_coordinator::{http, AppState, Config};

/// TestRun coordinator: builds uploaded projects and distributes their tests.
#[derive(Parser, Debug)]
#[command(name = "testrun-coordinator", about = "TestRun coordinator server")]
struct Args {
    /// HTTP server address
    #[arg(long, env = "TESTRUN_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Directory for uploaded archives (cleaned at startup)
    #[arg(long, env = "TESTRUN_UPLOADS", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Worker to register at startup (repeatable)
    #[arg(long = "worker", env = "TESTRUN_WORKERS", value_delimiter = ',')]
    workers: Vec<String>,

    /// Path to the cargo executable
    #[arg(long, env = "TESTRUN_CARGO", default_value = "cargo")]
    cargo: String,

    /// Worker ping timeout in seconds
    #[arg(long, default_value = "5")]
    probe_timeout_secs: u64,

    /// Per-chunk dispatch timeout in seconds
    #[arg(long, default_value = "120")]
    dispatch_timeout_secs: u64,

    /// Local build timeout in seconds
    #[arg(long, default_value = "600")]
    build_timeout_secs: u64,

    /// Local per-test timeout in seconds
    #[arg(long, default_value = "60")]
    test_timeout_secs: u64,

    /// Timeout in seconds for requests other than test runs
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind,
            uploads_dir: args.uploads_dir,
            workers: args.workers,
            cargo_path: args.cargo,
            probe_timeout: Duration::from_secs(args.probe_timeout_secs),
            dispatch_timeout: Duration::from_secs(args.dispatch_timeout_secs),
            build_timeout: Duration::from_secs(args.build_timeout_secs),
            test_timeout: Duration::from_secs(args.test_timeout_secs),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            ..Config::default()
        }
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

    let shutdown = install_shutdown_handler();
    let state = AppState::new(config, shutdown.clone())?;
    let router = http::create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "TestRun coordinator listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("TestRun coordinator stopped");
    Ok(())
}
