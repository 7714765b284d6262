//! Lifecycle decorator.
//!
//! [`ConfigDecorator`] wraps a host lifecycle and runs three stages per call:
//!
//! 1. the wrapped lifecycle's own create/delete
//! 2. the configuration engine: resolve targets, then render-and-write (or
//!    remove) every target concurrently
//! 3. the service reload
//!
//! A stage only runs if the previous one succeeded. Stage 2 is not
//! transactional: when one target fails, targets that already completed stay
//! written or removed, and the error is returned as-is.

use std::sync::Arc;

use async_trait::async_trait;
use branchconf_runner::{CommandRunner, ServiceReloader};
use branchconf_templates::{EjsRenderer, RenderGateway, TemplateData};
use tracing::{debug, info, warn};

use crate::branch::sanitize;
use crate::config::{RepoConfig, RootConfig};
use crate::error::{CoreError, CoreResult, FsAction};
use crate::fanout;
use crate::lifecycle::{InstanceLifecycle, LifecycleOptions};
use crate::path::PathResolver;
use crate::target::{Target, TargetResolver};

/// Decorates a lifecycle with instance configuration files.
pub struct ConfigDecorator<L> {
    inner: L,
    repo_config: RepoConfig,
    targets: TargetResolver,
    paths: PathResolver,
    renderer: Arc<dyn RenderGateway>,
    reloader: ServiceReloader,
}

impl<L: InstanceLifecycle> ConfigDecorator<L> {
    /// Wrap `inner`.
    ///
    /// Fails when the root configuration has no `nginx` section or its
    /// target groups are malformed; the decorator is never built in that
    /// case.
    pub fn new(
        inner: L,
        root: &RootConfig,
        repo_config: RepoConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> CoreResult<Self> {
        let targets = TargetResolver::new(root)?;
        let settings = targets.settings();

        let paths = PathResolver::new(&settings.conf_dir, inner.repo());
        let reloader = ServiceReloader::new(runner, settings.service.clone()).sudo(settings.sudo);

        debug!("Decorating lifecycle of {}", inner.repo());

        Ok(Self {
            inner,
            repo_config,
            targets,
            paths,
            renderer: Arc::new(EjsRenderer::new()),
            reloader,
        })
    }

    /// Use a different template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn RenderGateway>) -> Self {
        self.renderer = renderer;
        self
    }

    /// The wrapped lifecycle.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn reloader(&self) -> &ServiceReloader {
        &self.reloader
    }

    /// Targets for the current repository configuration.
    pub fn targets(&self) -> CoreResult<Vec<Target>> {
        self.targets.resolve(&self.repo_config)
    }

    /// Data bag for templates: the sanitized branch, overridden by whatever
    /// the wrapped lifecycle supplies.
    pub fn template_data_for(&self, branch: &str) -> TemplateData {
        let mut data = TemplateData::new();
        data.insert("branch".into(), sanitize(branch).into());
        if let Some(extra) = self.inner.template_data() {
            data.extend(extra);
        }
        data
    }

    async fn write_target(&self, target: &Target, branch: &str, data: &TemplateData) -> CoreResult<()> {
        let source = self.paths.source_path(target);
        let content = self
            .renderer
            .render(&source, data)
            .await
            .map_err(|e| CoreError::Render {
                template: source.clone(),
                source: e,
            })?;

        let destination = self.paths.destination_path(target, branch).await?;
        tokio::fs::write(&destination, content)
            .await
            .map_err(|e| CoreError::fs(FsAction::Write, &destination, e))?;

        debug!("Wrote {:?} from {:?}", destination, source);
        Ok(())
    }

    async fn remove_target(&self, target: &Target, branch: &str, force: bool) -> CoreResult<()> {
        let destination = self.paths.destination_path(target, branch).await?;

        match tokio::fs::remove_file(&destination).await {
            Ok(()) => {
                debug!("Removed {:?}", destination);
                Ok(())
            }
            Err(e) if force && e.kind() == std::io::ErrorKind::NotFound => {
                warn!("[delete] ignoring missing file {:?}: {}", destination, e);
                Ok(())
            }
            Err(e) => Err(CoreError::fs(FsAction::Remove, &destination, e)),
        }
    }
}

#[async_trait]
impl<L: InstanceLifecycle> InstanceLifecycle for ConfigDecorator<L> {
    fn repo(&self) -> &str {
        self.inner.repo()
    }

    async fn create(&self, branch: &str, options: &LifecycleOptions) -> CoreResult<()> {
        info!("create: {} ({})", branch, self.repo());

        self.inner.create(branch, options).await?;

        let targets = self.targets()?;
        let data = self.template_data_for(branch);
        fanout::run_all(&targets, |target| self.write_target(target, branch, &data)).await?;
        info!("Wrote {} configuration file(s) for {}", targets.len(), branch);

        self.reloader.reload().await?;
        Ok(())
    }

    async fn delete(&self, branch: &str, options: &LifecycleOptions) -> CoreResult<()> {
        info!("delete: {} ({})", branch, self.repo());

        self.inner.delete(branch, options).await?;

        let targets = self.targets()?;
        let force = options.force;
        fanout::run_all(&targets, |target| self.remove_target(target, branch, force)).await?;
        info!("Removed {} configuration file(s) for {}", targets.len(), branch);

        self.reloader.reload().await?;
        Ok(())
    }

    fn template_data(&self) -> Option<TemplateData> {
        self.inner.template_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::MockInstanceLifecycle;
    use branchconf_runner::MockRunner;
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        root: RootConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let yaml = format!(
                "conf_dir: {}\nnginx:\n  conf_dir: {}\n",
                dir.path().join("browl").display(),
                dir.path().join("conf.d").display()
            );
            let root = RootConfig::from_yaml_str(&yaml).unwrap();

            let templates = dir.path().join("browl/webapp/templates");
            fs::create_dir_all(&templates).unwrap();
            fs::write(templates.join("nginx.tmpl"), "content:<%= branch %>").unwrap();

            Self { dir, root }
        }

        fn output(&self, branch: &str) -> std::path::PathBuf {
            self.dir.path().join(format!("conf.d/webapp_{}.conf", branch))
        }
    }

    fn lifecycle() -> MockInstanceLifecycle {
        let mut mock = MockInstanceLifecycle::new();
        mock.expect_repo().return_const("webapp".to_string());
        mock.expect_template_data().returning(|| None);
        mock
    }

    #[tokio::test]
    async fn test_create_calls_inner_then_writes_then_reloads() {
        let fixture = Fixture::new();
        let runner = MockRunner::new();

        let mut inner = lifecycle();
        inner
            .expect_create()
            .with(eq("develop"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(()));

        let decorator =
            ConfigDecorator::new(inner, &fixture.root, RepoConfig::default(), Arc::new(runner.clone()))
                .unwrap();

        decorator
            .create("develop", &LifecycleOptions::default())
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(fixture.output("develop")).unwrap(),
            "content:develop"
        );
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_inner_failure_short_circuits() {
        let fixture = Fixture::new();
        let runner = MockRunner::new();

        let mut inner = lifecycle();
        inner
            .expect_create()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("checkout failed").into()));

        let decorator =
            ConfigDecorator::new(inner, &fixture.root, RepoConfig::default(), Arc::new(runner.clone()))
                .unwrap();

        let err = decorator
            .create("develop", &LifecycleOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Lifecycle(_)));
        assert_eq!(err.to_string(), "checkout failed");
        assert!(!fixture.output("develop").exists());
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_inner_delete_failure_leaves_files() {
        let fixture = Fixture::new();
        let runner = MockRunner::new();
        fs::create_dir_all(fixture.dir.path().join("conf.d")).unwrap();
        fs::write(fixture.output("develop"), "x").unwrap();

        let mut inner = lifecycle();
        inner
            .expect_delete()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("still running").into()));

        let decorator =
            ConfigDecorator::new(inner, &fixture.root, RepoConfig::default(), Arc::new(runner.clone()))
                .unwrap();

        assert!(decorator
            .delete("develop", &LifecycleOptions::default())
            .await
            .is_err());
        assert!(fixture.output("develop").exists());
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_host_template_data_overrides_branch() {
        let fixture = Fixture::new();

        let mut inner = MockInstanceLifecycle::new();
        inner.expect_repo().return_const("webapp".to_string());
        inner.expect_template_data().returning(|| {
            let mut data = TemplateData::new();
            data.insert("branch".into(), "quux".into());
            Some(data)
        });

        let decorator = ConfigDecorator::new(
            inner,
            &fixture.root,
            RepoConfig::default(),
            Arc::new(MockRunner::new()),
        )
        .unwrap();

        let data = decorator.template_data_for("feature/x");
        assert_eq!(data["branch"], "quux");
    }

    #[test]
    fn test_construction_requires_section() {
        let root = RootConfig::from_yaml_str("conf_dir: /etc/browl\n").unwrap();
        let mut inner = MockInstanceLifecycle::new();
        inner.expect_repo().return_const("webapp".to_string());

        let result = ConfigDecorator::new(inner, &root, RepoConfig::default(), Arc::new(MockRunner::new()));
        assert!(matches!(result, Err(CoreError::MissingSection(_))));
    }
}
