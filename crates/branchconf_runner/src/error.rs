//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running external commands.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i64,
        stderr: String,
    },

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}
