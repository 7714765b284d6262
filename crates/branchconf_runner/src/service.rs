//! Service reload side effect.

use std::sync::Arc;

use tracing::info;

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::CommandRunner;

/// Restarts a system service through a [`CommandRunner`].
#[derive(Clone)]
pub struct ServiceReloader {
    runner: Arc<dyn CommandRunner>,
    service: String,
    sudo: bool,
}

impl ServiceReloader {
    /// Create a reloader for `service`, run through `sudo`.
    pub fn new(runner: Arc<dyn CommandRunner>, service: impl Into<String>) -> Self {
        Self {
            runner,
            service: service.into(),
            sudo: true,
        }
    }

    /// Set whether the restart goes through `sudo`.
    pub fn sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    /// Name of the reloaded service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The command issued by [`reload`](Self::reload).
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new("service")
            .args([self.service.as_str(), "restart"])
            .sudo(self.sudo)
    }

    /// Restart the service. A non-zero exit is an error.
    pub async fn reload(&self) -> RunnerResult<()> {
        let command = self.command();
        info!("Reloading service: {}", self.service);

        let result = self.runner.run(&command).await?;
        if !result.success() {
            return Err(RunnerError::CommandFailed {
                command: command.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}
