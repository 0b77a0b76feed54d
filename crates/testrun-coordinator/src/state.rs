//! Shared application state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use testrun_core::WorkerAddr;
use testrun_runner::CargoToolchain;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::StartupError;
use crate::metrics::RunMetrics;
use crate::registry::WorkerRegistry;
use crate::transport::HttpTransport;

/// Shared application state.
pub struct AppState {
    /// Effective configuration.
    pub config: Config,

    /// Run orchestration; owns the worker registry.
    pub coordinator: Coordinator,

    /// Counters over finished runs.
    pub metrics: RunMetrics,

    /// Cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the production state: HTTP transport and cargo toolchain.
    pub fn new(config: Config, shutdown: CancellationToken) -> Result<Arc<Self>, StartupError> {
        let workers = config
            .workers
            .iter()
            .map(|raw| WorkerAddr::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        info!(workers = workers.len(), "Loaded startup workers");

        let registry = Arc::new(WorkerRegistry::with_workers(workers));
        let transport = Arc::new(HttpTransport::new(config.probe_timeout)?);
        let toolchain = Arc::new(
            CargoToolchain::new(config.cargo_path.clone())
                .with_timeout(config.test_timeout)
                .with_build_timeout(config.build_timeout),
        );

        let coordinator = Coordinator::new(registry, transport, toolchain, &config, shutdown.clone());
        Ok(Self::with_coordinator(config, coordinator, shutdown))
    }

    /// Build state around an existing coordinator.
    pub fn with_coordinator(
        config: Config,
        coordinator: Coordinator,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            coordinator,
            metrics: RunMetrics::new(),
            shutdown,
        })
    }
}
