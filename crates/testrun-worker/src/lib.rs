//! TestRun Worker Library
//!
//! Serves the worker side of the test distribution protocol: receives an
//! archive plus a list of test names, runs exactly those tests locally and
//! answers their results.

pub mod config;
pub mod error;
pub mod http;
pub mod state;

pub use config::Config;
pub use error::WorkerError;
pub use state::WorkerState;
