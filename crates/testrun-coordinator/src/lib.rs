//! TestRun Coordinator Library
//!
//! Receives uploaded source archives, builds them, and splits their tests
//! across registered workers, falling back to local execution when none is
//! reachable. Every run produces a [`testrun_core::RunReport`].

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod metrics;
pub mod prober;
pub mod registry;
pub mod shutdown;
pub mod state;
pub mod transport;

pub use config::Config;
pub use coordinator::{Coordinator, ExtractedArtifact};
pub use error::{DispatchError, RunError, StartupError};
pub use prober::Prober;
pub use registry::WorkerRegistry;
pub use state::AppState;
pub use transport::{Artifact, HttpTransport, WorkerTransport};
