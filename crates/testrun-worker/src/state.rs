//! Shared worker state.

use std::sync::Arc;

use testrun_runner::{CargoToolchain, Toolchain};

use crate::config::Config;

/// Shared worker state.
pub struct WorkerState {
    pub config: Config,

    /// Runs the tests of each received chunk.
    pub toolchain: Arc<dyn Toolchain>,
}

impl WorkerState {
    /// State backed by the cargo toolchain.
    pub fn new(config: Config) -> Arc<Self> {
        let toolchain = CargoToolchain::new(config.cargo_path.clone()).with_timeout(config.test_timeout);
        Self::with_toolchain(config, Arc::new(toolchain))
    }

    pub fn with_toolchain(config: Config, toolchain: Arc<dyn Toolchain>) -> Arc<Self> {
        Arc::new(Self { config, toolchain })
    }
}
