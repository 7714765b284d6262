//! Target resolution.
//!
//! A [`Target`] pairs one template reference with the group it is written
//! into. Targets are recomputed on every create/delete call from the
//! normalized root settings and the repository configuration.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{ConfigShape, GroupSettings, ProxySettings, RepoConfig, RootConfig};
use crate::error::{CoreError, CoreResult};

/// One template to materialize for an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Group the target belongs to
    pub group: String,
    /// Group output root, from the root configuration
    pub output_root: PathBuf,
    /// Group settings, from the repository configuration
    pub settings: GroupSettings,
    /// Template reference, absolute or relative to the repo template root
    pub template: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.template)
    }
}

/// Expands configuration into an ordered list of targets.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    settings: ProxySettings,
}

impl TargetResolver {
    /// Create a resolver, validating the root configuration.
    pub fn new(root: &RootConfig) -> CoreResult<Self> {
        Ok(Self::from_settings(ProxySettings::from_root(root)?))
    }

    pub fn from_settings(settings: ProxySettings) -> Self {
        Self { settings }
    }

    /// Normalized root settings.
    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    /// Resolve the targets declared by `repo`.
    ///
    /// Groups come in root declaration order, files in repo declaration
    /// order. In the explicit form a group missing from `repo` is skipped.
    pub fn resolve(&self, repo: &RepoConfig) -> CoreResult<Vec<Target>> {
        match self.settings.shape {
            ConfigShape::Implicit => Ok(self.resolve_implicit(repo)),
            ConfigShape::Explicit => self.resolve_explicit(repo),
        }
    }

    fn resolve_implicit(&self, repo: &RepoConfig) -> Vec<Target> {
        let section = repo.nginx.as_ref();
        let template = section
            .and_then(|s| s.template.clone())
            .unwrap_or_else(|| self.settings.default_template.clone());
        let path = section
            .and_then(|s| s.destination.clone())
            .or_else(|| self.settings.default_destination.clone());

        self.settings
            .groups
            .iter()
            .map(|group| Target {
                group: group.name.clone(),
                output_root: group.path.clone(),
                settings: GroupSettings {
                    path: path.clone(),
                    files: vec![template.clone()],
                },
                template: template.clone(),
            })
            .collect()
    }

    fn resolve_explicit(&self, repo: &RepoConfig) -> CoreResult<Vec<Target>> {
        let mut targets = Vec::new();
        let Some(section) = repo.nginx.as_ref() else {
            debug!("Repository declares no target groups");
            return Ok(targets);
        };

        for group in &self.settings.groups {
            let Some(block) = section.groups.get(&group.name) else {
                debug!("Skipping group '{}': not declared by repository", group.name);
                continue;
            };

            let settings: GroupSettings = serde_json::from_value(block.clone()).map_err(|e| {
                CoreError::InvalidConfig(format!(
                    "target group '{}' in repository configuration: {}",
                    group.name, e
                ))
            })?;

            for file in &settings.files {
                targets.push(Target {
                    group: group.name.clone(),
                    output_root: group.path.clone(),
                    settings: settings.clone(),
                    template: file.clone(),
                });
            }
        }

        Ok(targets)
    }
}
