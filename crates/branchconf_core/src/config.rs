//! Root and repository configuration.
//!
//! Both files are owned by the host and only read here. The root section
//! comes in two shapes:
//!
//! - **implicit**: one output directory (`nginx.conf_dir`) and one template
//! - **explicit**: a `targets` list naming groups, each with its own `path`
//!
//! [`ProxySettings::from_root`] folds either shape into a uniform list of
//! [`GroupRoot`]s once, when the decorator is built.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult, FsAction};

/// Name of the required root section.
pub const SECTION: &str = "nginx";

/// Template used when neither root nor repo configuration names one.
pub const DEFAULT_TEMPLATE: &str = "./templates/nginx.tmpl";

/// Service restarted after every successful create/delete.
pub const DEFAULT_SERVICE: &str = "nginx";

/// Process-wide root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootConfig {
    /// Base directory holding per-repo template folders
    #[serde(default)]
    pub conf_dir: PathBuf,
    #[serde(default)]
    pub nginx: Option<RootSection>,
}

/// The `nginx` section of the root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootSection {
    /// Output directory for the implicit single-group form
    #[serde(default)]
    pub conf_dir: Option<PathBuf>,
    /// Default template for the implicit form
    #[serde(default)]
    pub template: Option<String>,
    /// Default destination expression for the implicit form
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_sudo")]
    pub sudo: bool,
    /// Named target groups, in output order
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    /// Per-group settings blocks, keyed by group name
    #[serde(flatten)]
    pub groups: BTreeMap<String, Value>,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_sudo() -> bool {
    true
}

/// Per-repository configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub nginx: Option<RepoSection>,
}

/// The `nginx` section of a repository configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoSection {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Per-group blocks for the explicit form
    #[serde(flatten)]
    pub groups: BTreeMap<String, Value>,
}

/// Root-level settings of one target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoot {
    #[serde(default)]
    pub name: String,
    /// Output root for every file of the group
    pub path: PathBuf,
}

/// Repo-level settings of one target group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Destination path expression, relative to the group's output root
    #[serde(default)]
    pub path: Option<String>,
    /// Template references, in output order
    #[serde(default)]
    pub files: Vec<String>,
}

/// Which root shape the settings were normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigShape {
    Implicit,
    Explicit,
}

/// Root configuration normalized into a list of groups.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub shape: ConfigShape,
    /// Base directory for relative template references
    pub conf_dir: PathBuf,
    pub groups: Vec<GroupRoot>,
    pub default_template: String,
    pub default_destination: Option<String>,
    pub service: String,
    pub sudo: bool,
}

impl ProxySettings {
    /// Validate and normalize the root configuration.
    pub fn from_root(root: &RootConfig) -> CoreResult<Self> {
        let section = root
            .nginx
            .as_ref()
            .ok_or_else(|| CoreError::MissingSection(SECTION.to_string()))?;

        let (shape, groups) = match &section.targets {
            Some(names) => {
                let mut groups = Vec::with_capacity(names.len());
                for name in names {
                    let block = section.groups.get(name).ok_or_else(|| {
                        CoreError::InvalidConfig(format!(
                            "target group '{}' has no settings in root configuration",
                            name
                        ))
                    })?;
                    let mut group: GroupRoot =
                        serde_json::from_value(block.clone()).map_err(|e| {
                            CoreError::InvalidConfig(format!(
                                "target group '{}' in root configuration: {}",
                                name, e
                            ))
                        })?;
                    group.name = name.clone();
                    groups.push(group);
                }
                (ConfigShape::Explicit, groups)
            }
            None => {
                let path = section.conf_dir.clone().ok_or_else(|| {
                    CoreError::InvalidConfig(format!("{}.conf_dir is not set", SECTION))
                })?;
                let group = GroupRoot {
                    name: SECTION.to_string(),
                    path,
                };
                (ConfigShape::Implicit, vec![group])
            }
        };

        Ok(Self {
            shape,
            conf_dir: root.conf_dir.clone(),
            groups,
            default_template: section
                .template
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            default_destination: section.destination.clone(),
            service: section.service.clone(),
            sudo: section.sudo,
        })
    }
}

impl RootConfig {
    /// Load from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        load_yaml(path.as_ref())
    }

    /// Parse from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

impl RepoConfig {
    /// Load from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        load_yaml(path.as_ref())
    }

    /// Parse from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

fn load_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> CoreResult<T> {
    let content = fs::read_to_string(path).map_err(|e| CoreError::fs(FsAction::Read, path, e))?;
    serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}
