//! CLI command definitions.
//!
//! Both subcommands share [`InstanceArgs`]: which configuration to load,
//! which repository and branch the instance belongs to, and how to run the
//! service reload.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use branchconf_core::{ConfigDecorator, NullLifecycle, RepoConfig, RootConfig};
use branchconf_runner::{ProcessRunner, ProcessRunnerOptions};
use branchconf_templates::TemplateData;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

pub mod create;
pub mod delete;

/// branchconf - per-branch reverse proxy configuration
#[derive(Parser)]
#[command(name = "branchconf")]
#[command(version, about = "Write and remove per-branch reverse proxy configuration")]
#[command(long_about = r#"
branchconf renders reverse proxy configuration for a branch instance of a
repository, writes (or removes) the resulting files and restarts the proxy
service.

COMMANDS:
  create  → render and write every configured file, then reload
  delete  → remove every configured file, then reload

Files are written (or removed) in parallel and not rolled back: when one
file fails, the others may already be in place and the service is not
reloaded. Re-run the command once the cause is fixed.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
  5 - File system error
  6 - Service reload failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write configuration files for a branch instance
    Create(create::CreateArgs),

    /// Remove configuration files of a branch instance
    Delete(delete::DeleteArgs),
}

/// Arguments identifying an instance and its configuration.
#[derive(Args, Debug)]
pub struct InstanceArgs {
    /// Root configuration file
    #[arg(long, env = "BRANCHCONF_ROOT_CONFIG", default_value = "/etc/browl/config.yml")]
    pub root_config: PathBuf,

    /// Repository configuration file (defaults to <conf_dir>/<repo>/config.yml)
    #[arg(long)]
    pub repo_config: Option<PathBuf>,

    /// Repository name
    #[arg(short, long)]
    pub repo: String,

    /// Branch the instance is built from
    pub branch: String,

    /// Extra template values, as key=value
    #[arg(short, long = "data", value_parser = parse_data)]
    pub data: Vec<(String, String)>,

    /// Log the reload command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl InstanceArgs {
    /// Load configuration and build the decorated lifecycle.
    pub fn lifecycle(&self) -> Result<ConfigDecorator<NullLifecycle>> {
        let root = RootConfig::load(&self.root_config)
            .with_context(|| format!("Failed to load root configuration {:?}", self.root_config))?;

        let repo_path = self
            .repo_config
            .clone()
            .unwrap_or_else(|| root.conf_dir.join(&self.repo).join("config.yml"));
        let repo = if self.repo_config.is_some() || repo_path.exists() {
            RepoConfig::load(&repo_path).with_context(|| {
                format!("Failed to load repository configuration {:?}", repo_path)
            })?
        } else {
            debug!("No repository configuration at {:?}, using defaults", repo_path);
            RepoConfig::default()
        };

        let mut inner = NullLifecycle::new(&self.repo);
        if !self.data.is_empty() {
            inner = inner.with_template_data(template_data(&self.data));
        }

        let runner = Arc::new(ProcessRunner::new(ProcessRunnerOptions {
            dry_run: self.dry_run,
        }));

        Ok(ConfigDecorator::new(inner, &root, repo, runner)?)
    }
}

fn template_data(pairs: &[(String, String)]) -> TemplateData {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect()
}

fn parse_data(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid argument '{}': expected key=value", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_data() {
        assert_eq!(
            parse_data("port=8080").unwrap(),
            ("port".to_string(), "8080".to_string())
        );
        assert_eq!(
            parse_data("url=http://a/?b=c").unwrap(),
            ("url".to_string(), "http://a/?b=c".to_string())
        );
        assert!(parse_data("novalue").is_err());
        assert!(parse_data("=x").is_err());
    }

    #[test]
    fn test_cli_parses_create() {
        let cli = Cli::try_parse_from([
            "branchconf",
            "create",
            "--root-config",
            "/tmp/root.yml",
            "--repo",
            "webapp",
            "--data",
            "port=8080",
            "feature/login",
        ])
        .unwrap();

        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.instance.repo, "webapp");
                assert_eq!(args.instance.branch, "feature/login");
                assert_eq!(args.instance.data.len(), 1);
            }
            Commands::Delete(_) => panic!("expected create"),
        }
    }

    #[test]
    fn test_lifecycle_without_repo_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root.yml");
        fs::write(
            &root,
            format!(
                "conf_dir: {}\nnginx:\n  conf_dir: {}\n",
                dir.path().display(),
                dir.path().join("out").display()
            ),
        )
        .unwrap();

        let args = InstanceArgs {
            root_config: root,
            repo_config: None,
            repo: "webapp".into(),
            branch: "develop".into(),
            data: vec![("branch".into(), "quux".into())],
            dry_run: true,
        };

        let lifecycle = args.lifecycle().unwrap();
        assert_eq!(lifecycle.targets().unwrap().len(), 1);
        assert_eq!(lifecycle.template_data_for("develop")["branch"], "quux");
    }

    #[test]
    fn test_lifecycle_missing_section_is_core_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root.yml");
        fs::write(&root, "conf_dir: /etc/browl\n").unwrap();

        let args = InstanceArgs {
            root_config: root,
            repo_config: None,
            repo: "webapp".into(),
            branch: "develop".into(),
            data: Vec::new(),
            dry_run: true,
        };

        match args.lifecycle() {
            Err(err) => assert!(matches!(
                err.downcast_ref::<branchconf_core::CoreError>(),
                Some(branchconf_core::CoreError::MissingSection(_))
            )),
            Ok(_) => panic!("lifecycle built without nginx section"),
        }
    }
}
