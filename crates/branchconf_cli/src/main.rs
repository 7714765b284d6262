//! branchconf CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments (reported by clap)
//! - 3: Configuration error
//! - 4: Template error
//! - 5: File system error
//! - 6: Service reload failure

use std::process::ExitCode;

use branchconf_core::{CoreError, FsAction};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const FILESYSTEM_ERROR: u8 = 5;
    pub const RELOAD_ERROR: u8 = 6;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "branchconf=debug"
    } else if cli.quiet {
        "branchconf=warn"
    } else {
        "branchconf=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}", default_level)));

    // Already initialized is fine
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(args).await,
        Commands::Delete(args) => commands::delete::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<CoreError>() {
        Some(CoreError::MissingSection(_))
        | Some(CoreError::InvalidConfig(_))
        | Some(CoreError::ConfigParse { .. })
        | Some(CoreError::FileSystem {
            action: FsAction::Read,
            ..
        }) => ExitCodes::CONFIG_ERROR,
        Some(CoreError::Render { .. }) | Some(CoreError::PathExpression { .. }) => {
            ExitCodes::TEMPLATE_ERROR
        }
        Some(CoreError::FileSystem { .. }) => ExitCodes::FILESYSTEM_ERROR,
        Some(CoreError::Reload(_)) => ExitCodes::RELOAD_ERROR,
        Some(CoreError::Lifecycle(_)) | None => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use branchconf_core::RootConfig;

    #[test]
    fn test_missing_root_config_is_config_error() {
        let err = RootConfig::load("/nonexistent/branchconf/root.yml")
            .context("Failed to load root configuration")
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::CONFIG_ERROR);
    }

    #[test]
    fn test_categories() {
        let io = || std::io::Error::from(std::io::ErrorKind::PermissionDenied);

        let write = anyhow::Error::from(CoreError::FileSystem {
            action: FsAction::Write,
            path: "/etc/nginx/conf.d/a.conf".into(),
            source: io(),
        });
        assert_eq!(categorize_error(&write), ExitCodes::FILESYSTEM_ERROR);

        let section = anyhow::Error::from(CoreError::MissingSection("nginx".into()));
        assert_eq!(categorize_error(&section), ExitCodes::CONFIG_ERROR);

        let other = anyhow::anyhow!("invalid argument");
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }
}
