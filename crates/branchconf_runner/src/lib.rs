//! # branchconf_runner
//!
//! Process execution for branchconf.
//!
//! After instance configuration files are written or removed, the reverse
//! proxy has to pick them up. This crate provides the process-execution seam
//! used for that reload:
//!
//! - **CommandRunner**: async trait for running one external command
//! - **ProcessRunner**: `tokio::process` implementation with a dry-run mode
//! - **MockRunner**: recording runner for tests
//! - **ServiceReloader**: issues `service <name> restart`, optionally via sudo
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use branchconf_runner::{ProcessRunner, ProcessRunnerOptions, ServiceReloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(ProcessRunner::new(ProcessRunnerOptions::default()));
//!     let reloader = ServiceReloader::new(runner, "nginx");
//!     reloader.reload().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;
pub mod service;

pub use config::CommandSpec;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use process::{ProcessRunner, ProcessRunnerOptions};
pub use runner::{CommandRunner, ExecutionResult};
pub use service::ServiceReloader;
