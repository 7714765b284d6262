//! # branchconf_core
//!
//! Instance configuration lifecycle engine.
//!
//! A deployment host creates and deletes branch instances of a repository.
//! This crate decorates that lifecycle so every instance also gets its
//! reverse-proxy configuration files, rendered from templates, written on
//! create and removed on delete, followed by a service reload.
//!
//! # Architecture
//!
//! - **TargetResolver**: expands root + repo configuration into targets
//! - **PathResolver**: computes template sources and output destinations
//! - **fanout**: runs per-target work concurrently, best effort
//! - **ConfigDecorator**: sequences wrapped lifecycle → targets → reload
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use branchconf_core::{
//!     ConfigDecorator, InstanceLifecycle, LifecycleOptions, NullLifecycle, RepoConfig, RootConfig,
//! };
//! use branchconf_runner::{ProcessRunner, ProcessRunnerOptions};
//!
//! # async fn demo() -> branchconf_core::CoreResult<()> {
//! let root = RootConfig::load("/etc/browl/config.yml")?;
//! let repo = RepoConfig::load("/etc/browl/webapp/config.yml")?;
//! let runner = Arc::new(ProcessRunner::new(ProcessRunnerOptions::default()));
//!
//! let lifecycle = ConfigDecorator::new(NullLifecycle::new("webapp"), &root, repo, runner)?;
//! lifecycle.create("feature/login", &LifecycleOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod branch;
pub mod config;
pub mod decorator;
pub mod error;
pub mod fanout;
pub mod lifecycle;
pub mod path;
pub mod target;

pub use branch::sanitize;
pub use config::{
    ConfigShape, GroupRoot, GroupSettings, ProxySettings, RepoConfig, RepoSection, RootConfig,
    RootSection,
};
pub use decorator::ConfigDecorator;
pub use error::{CoreError, CoreResult, FsAction};
pub use lifecycle::{InstanceLifecycle, LifecycleOptions, NullLifecycle};
pub use path::PathResolver;
pub use target::{Target, TargetResolver};
