//! Worker registry.
//!
//! Holds the worker endpoints an operator has registered. Entries are never
//! removed while the coordinator runs; liveness is decided per run by the
//! prober, not stored here.

use tokio::sync::RwLock;
use tracing::info;

use testrun_core::WorkerAddr;

/// Registered worker endpoints, in registration order.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: RwLock<Vec<WorkerAddr>>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `workers`. Duplicates are dropped.
    pub fn with_workers(workers: impl IntoIterator<Item = WorkerAddr>) -> Self {
        let mut unique: Vec<WorkerAddr> = Vec::new();
        for addr in workers {
            if !unique.contains(&addr) {
                unique.push(addr);
            }
        }
        Self {
            workers: RwLock::new(unique),
        }
    }

    /// Register a worker. Returns false if it was already registered.
    pub async fn register(&self, addr: WorkerAddr) -> bool {
        let mut workers = self.workers.write().await;
        if workers.contains(&addr) {
            return false;
        }

        info!(worker = %addr, "Registered worker");
        workers.push(addr);
        true
    }

    /// Copy of the registered endpoints.
    pub async fn snapshot(&self) -> Vec<WorkerAddr> {
        self.workers.read().await.clone()
    }

    /// Number of registered workers.
    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Returns true if no worker is registered.
    pub async fn is_empty(&self) -> bool {
        self.workers.read().await.is_empty()
    }
}
