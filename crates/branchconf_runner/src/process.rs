//! Process-based command runner.
//!
//! Spawns commands with `tokio::process`, so a slow reload suspends the
//! calling task instead of blocking a runtime worker.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Process runner options.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunnerOptions {
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
}

impl ProcessRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Runs commands as child processes of the host.
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
}

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self { options }
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> RunnerResult<ExecutionResult> {
        let cmd_str = command.to_string();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            let now = Utc::now();
            return Ok(ExecutionResult {
                exit_code: 0,
                stdout: format!("[DRY-RUN] Command: {}", cmd_str),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        let argv = command.argv();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| RunnerError::ExecutionFailed("empty command".to_string()))?;

        debug!("Executing: {}", cmd_str);

        let started_at = Utc::now();
        let start = Instant::now();
        let output = Command::new(program)
            .args(args)
            .envs(&command.env)
            .output()
            .await
            .map_err(|e| RunnerError::SpawnFailed {
                command: cmd_str.clone(),
                source: e,
            })?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let exit_code = output.status.code().unwrap_or(-1) as i64;
        if exit_code == 0 {
            debug!("`{}` completed in {}ms", cmd_str, duration_ms);
        } else {
            error!(
                "`{}` failed with exit code {} after {}ms",
                cmd_str, exit_code, duration_ms
            );
        }

        Ok(ExecutionResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }
}
