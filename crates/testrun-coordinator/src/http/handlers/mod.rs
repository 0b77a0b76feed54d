//! HTTP request handlers.

mod health;
mod runs;
mod workers;

pub use health::{health_check, metrics_handler};
pub use runs::submit_run;
pub use workers::{list_workers, register_worker};
