//! Liveness prober.
//!
//! Pings every registered worker concurrently before a run. A failed ping
//! marks the worker dead for that cycle only; it stays registered.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use testrun_core::{WorkerAddr, WorkerProbe};

use crate::error::DispatchError;
use crate::registry::WorkerRegistry;
use crate::transport::WorkerTransport;

/// Pings workers through a [`WorkerTransport`] with a bounded timeout.
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn WorkerTransport>,
    timeout: Duration,
}

impl Prober {
    pub fn new(transport: Arc<dyn WorkerTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Probe every registered worker, in registry order.
    pub async fn probe(&self, registry: &WorkerRegistry) -> Vec<WorkerProbe> {
        let workers = registry.snapshot().await;
        debug!(count = workers.len(), "Probing workers");

        let probes = join_all(workers.into_iter().map(|addr| self.probe_one(addr))).await;

        let alive = probes.iter().filter(|p| p.is_alive()).count();
        info!(registered = probes.len(), alive, "Probe cycle complete");
        probes
    }

    /// Workers that answered their ping this cycle, in registry order.
    pub async fn active_workers(&self, registry: &WorkerRegistry) -> Vec<WorkerAddr> {
        self.probe(registry)
            .await
            .into_iter()
            .filter(|p| p.status.can_accept_chunks())
            .map(|p| p.addr)
            .collect()
    }

    async fn probe_one(&self, addr: WorkerAddr) -> WorkerProbe {
        let result = match tokio::time::timeout(self.timeout, self.transport.ping(&addr)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => WorkerProbe::alive(addr),
            Err(e) => {
                warn!(worker = %addr, error = %e, "Worker is not reachable");
                WorkerProbe::dead(addr, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use testrun_core::{Chunk, TestResult, WorkerStatus};

    use super::*;
    use crate::transport::Artifact;

    /// Workers whose host starts with `up` answer, `slow` hangs, anything
    /// else refuses.
    struct HostTransport;

    #[async_trait]
    impl WorkerTransport for HostTransport {
        async fn ping(&self, worker: &WorkerAddr) -> Result<(), DispatchError> {
            let host = worker.as_str().trim_start_matches("http://");
            if host.starts_with("up") {
                Ok(())
            } else if host.starts_with("slow") {
                std::future::pending().await
            } else {
                Err(DispatchError::Transport("connection refused".to_string()))
            }
        }

        async fn run_chunk(
            &self,
            _worker: &WorkerAddr,
            _artifact: &Artifact,
            _chunk: &Chunk,
        ) -> Result<Vec<TestResult>, DispatchError> {
            unreachable!("prober never dispatches")
        }
    }

    fn registry(hosts: &[&str]) -> WorkerRegistry {
        WorkerRegistry::with_workers(hosts.iter().map(|h| WorkerAddr::parse(h).unwrap()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_marks_dead_and_slow_workers() {
        let prober = Prober::new(Arc::new(HostTransport), Duration::from_secs(5));
        let registry = registry(&["up-1:8081", "down:8081", "slow:8081", "up-2:8081"]);

        let probes = prober.probe(&registry).await;
        let statuses: Vec<WorkerStatus> = probes.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![WorkerStatus::Alive, WorkerStatus::Dead, WorkerStatus::Dead, WorkerStatus::Alive]
        );
        assert_eq!(probes[1].error.as_deref(), Some("transport error: connection refused"));
        assert!(probes[2].error.as_deref().unwrap().starts_with("timed out"));

        // Dead workers stay registered.
        assert_eq!(registry.len().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_workers_keeps_registry_order() {
        let prober = Prober::new(Arc::new(HostTransport), Duration::from_secs(5));
        let registry = registry(&["up-b:1", "down:1", "up-a:1"]);

        let active = prober.active_workers(&registry).await;
        assert_eq!(
            active,
            vec![WorkerAddr::parse("up-b:1").unwrap(), WorkerAddr::parse("up-a:1").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_probe_empty_registry() {
        let prober = Prober::new(Arc::new(HostTransport), Duration::from_secs(5));
        assert!(prober.probe(&WorkerRegistry::new()).await.is_empty());
    }
}
