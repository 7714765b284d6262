//! Instance lifecycle contract.
//!
//! The deployment host owns the lifecycle of an instance (checkout, build,
//! process supervision). branchconf only decorates it, so the contract is
//! kept to what the decorator needs.

use std::path::PathBuf;

use async_trait::async_trait;
use branchconf_templates::TemplateData;

use crate::error::CoreResult;

/// Options passed through create/delete calls.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOptions {
    /// Treat already-missing files as deleted
    pub force: bool,
    /// Working directory of the instance, for the host's use
    pub cwd: Option<PathBuf>,
}

impl LifecycleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Create/delete lifecycle of a branch instance.
///
/// Host errors are carried as [`CoreError::Lifecycle`](crate::CoreError::Lifecycle).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstanceLifecycle: Send + Sync {
    /// Repository the instances belong to.
    fn repo(&self) -> &str;

    /// Create the instance for `branch`.
    async fn create(&self, branch: &str, options: &LifecycleOptions) -> CoreResult<()>;

    /// Delete the instance for `branch`.
    async fn delete(&self, branch: &str, options: &LifecycleOptions) -> CoreResult<()>;

    /// Extra values for configuration templates.
    ///
    /// Default: none.
    fn template_data(&self) -> Option<TemplateData> {
        None
    }
}

/// Lifecycle that does nothing besides naming its repository.
#[derive(Debug, Clone)]
pub struct NullLifecycle {
    repo: String,
    data: Option<TemplateData>,
}

impl NullLifecycle {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            data: None,
        }
    }

    /// Supply template data from this lifecycle.
    pub fn with_template_data(mut self, data: TemplateData) -> Self {
        self.data = Some(data);
        self
    }
}

#[async_trait]
impl InstanceLifecycle for NullLifecycle {
    fn repo(&self) -> &str {
        &self.repo
    }

    async fn create(&self, _branch: &str, _options: &LifecycleOptions) -> CoreResult<()> {
        Ok(())
    }

    async fn delete(&self, _branch: &str, _options: &LifecycleOptions) -> CoreResult<()> {
        Ok(())
    }

    fn template_data(&self) -> Option<TemplateData> {
        self.data.clone()
    }
}
