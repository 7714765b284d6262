//! Source and destination path computation.

use std::path::{Path, PathBuf};

use branchconf_templates::{EjsRenderer, TemplateData};
use tracing::debug;

use crate::branch::sanitize;
use crate::error::{CoreError, CoreResult, FsAction};
use crate::target::Target;

/// Resolves where a target's template lives and where its output goes.
pub struct PathResolver {
    repo: String,
    template_root: PathBuf,
    interpolator: EjsRenderer,
}

impl PathResolver {
    /// Create a resolver for `repo`, whose templates live under
    /// `<conf_dir>/<repo>`.
    pub fn new(conf_dir: impl AsRef<Path>, repo: impl Into<String>) -> Self {
        let repo = repo.into();
        Self {
            template_root: conf_dir.as_ref().join(&repo),
            repo,
            interpolator: EjsRenderer::verbatim(),
        }
    }

    /// Directory relative template references are resolved against.
    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Absolute path of the target's template.
    pub fn source_path(&self, target: &Target) -> PathBuf {
        let template = Path::new(&target.template);
        if template.is_absolute() {
            return template.to_path_buf();
        }
        let relative = template.strip_prefix("./").unwrap_or(template);
        self.template_root.join(relative)
    }

    /// Destination of the target's output for `branch`, without touching
    /// the file system.
    pub fn compute_destination(&self, target: &Target, branch: &str) -> CoreResult<PathBuf> {
        let branch = sanitize(branch);

        let relative = match &target.settings.path {
            Some(expression) => {
                let mut bindings = TemplateData::new();
                bindings.insert("repo".into(), self.repo.clone().into());
                bindings.insert("branch".into(), branch.into());
                bindings.insert("name".into(), template_name(&target.template).into());

                self.interpolator
                    .render_str(expression, &bindings)
                    .map_err(|e| CoreError::PathExpression {
                        expression: expression.clone(),
                        source: e,
                    })?
            }
            None => format!("{}_{}.conf", self.repo, branch),
        };

        Ok(target.output_root.join(relative))
    }

    /// Destination of the target's output for `branch`. Creates the parent
    /// directory when missing.
    pub async fn destination_path(&self, target: &Target, branch: &str) -> CoreResult<PathBuf> {
        let destination = self.compute_destination(target, branch)?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::fs(FsAction::CreateDir, parent, e))?;
        }

        debug!("Destination for {}: {:?}", target, destination);
        Ok(destination)
    }
}

/// Template file name without its extension.
fn template_name(template: &str) -> String {
    Path::new(template)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
