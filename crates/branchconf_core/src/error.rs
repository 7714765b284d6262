//! Error types for the core module.

use std::fmt;
use std::path::PathBuf;

use branchconf_runner::RunnerError;
use branchconf_templates::TemplateError;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// File system action that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAction {
    Read,
    Write,
    Remove,
    CreateDir,
}

impl fmt::Display for FsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsAction::Read => "read",
            FsAction::Write => "write",
            FsAction::Remove => "remove",
            FsAction::CreateDir => "create directory",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur during instance configuration operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0} is not set in root configuration")]
    MissingSection(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to render {template}: {source}")]
    Render {
        template: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("Failed to expand path expression `{expression}`: {source}")]
    PathExpression {
        expression: String,
        #[source]
        source: TemplateError,
    },

    #[error("Failed to {action} {path}: {source}")]
    FileSystem {
        action: FsAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Service reload failed: {0}")]
    Reload(#[from] RunnerError),

    #[error(transparent)]
    Lifecycle(#[from] anyhow::Error),
}

impl CoreError {
    /// Whether this is a file system error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::FileSystem { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    pub(crate) fn fs(action: FsAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }
}
