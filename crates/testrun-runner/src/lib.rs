//! Toolchain collaborators for TestRun
//!
//! Everything that touches the filesystem or spawns the build toolchain
//! lives here, behind small interfaces the coordinator and workers share:
//!
//! - [`Toolchain`]: build a source tree, run one test, discover tests.
//! - [`CargoToolchain`]: the cargo subprocess implementation.
//! - [`UploadDir`] / [`extract_archive`]: uploaded archive handling.
//! - [`run_all`]: sequential local execution of a test list.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use testrun_core::TestName;
//! use testrun_runner::{run_all, CargoToolchain, Toolchain};
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let toolchain = CargoToolchain::new("cargo");
//!     let build = toolchain.build(Path::new("./project")).await?;
//!     if build.success {
//!         let tests = vec![TestName::new("test_equals")];
//!         let results = run_all(&toolchain, &tests, Path::new("./project")).await;
//!         println!("{} results", results.len());
//!     }
//!     Ok(())
//! }
//! ```

mod archive;
mod cargo;
mod discovery;
mod error;
mod local;
mod toolchain;

// Re-export main types
pub use archive::{extract_archive, init_workspace, validate_entries, UploadDir};
pub use cargo::{parse_test_outcome, CargoToolchain, LineOutcome};
pub use discovery::{discover_tests, scan_source};
pub use error::RunnerError;
pub use local::run_all;
pub use toolchain::{BuildOutput, Toolchain};
