//! Per-invocation release state and the default release steps.

use super::graph::{Step, StepGraph, StepRunner};
use crate::artifacts::{self, ArtifactCollector, StagingManifest};
use crate::changelog::{self, ChangelogGenerator, ChangelogLayout};
use crate::config::{EnvConfig, ReleaseSettings};
use crate::error::{CliError, PipelineError, Result};
use crate::git::{GitInspector, ProcessRunner};
use crate::notify::{self, DispatchHandle, ReleaseNotifier};
use crate::placeholder::PlaceholderRegistry;
use crate::publish;
use crate::version::Version;
use std::path::PathBuf;

/// Resolve and report the release version
pub const STEP_VERSION: &str = "version";
/// Render and stage the changelog
pub const STEP_CHANGELOG: &str = "changelog";
/// Stage platform artifacts
pub const STEP_COLLECT: &str = "collect";
/// Write registry publish manifests
pub const STEP_PUBLISH: &str = "publish";
/// Announce the release
pub const STEP_NOTIFY: &str = "notify";

/// Default release graph
///
/// Changelog and notification failures degrade the release; version,
/// collection and publishing failures abort it.
pub fn release_steps() -> Vec<Step> {
    vec![
        Step::required(STEP_VERSION),
        Step::optional(STEP_CHANGELOG).after([STEP_VERSION]),
        Step::required(STEP_COLLECT).after([STEP_VERSION]),
        Step::required(STEP_PUBLISH).after([STEP_COLLECT, STEP_CHANGELOG]),
        Step::optional(STEP_NOTIFY).after([STEP_PUBLISH]),
    ]
}

/// Build the default release graph
pub fn release_graph() -> std::result::Result<StepGraph, PipelineError> {
    StepGraph::new(release_steps())
}

/// Everything one release invocation needs
pub struct ReleaseContext {
    settings: ReleaseSettings,
    env: EnvConfig,
    inspector: GitInspector,
    registry: PlaceholderRegistry,
    version: Version,
    changelog: Option<PathBuf>,
    staged: Option<StagingManifest>,
    manifests: Vec<PathBuf>,
    dispatch: Option<DispatchHandle>,
}

impl ReleaseContext {
    /// Create a context that queries the configured version-control executable
    pub fn new(settings: ReleaseSettings, env: EnvConfig) -> Result<Self> {
        let runner = ProcessRunner::new(
            settings.git.program.clone(),
            &settings.root,
            settings.git.timeout(),
        );
        Self::with_inspector(settings, env, GitInspector::new(runner))
    }

    /// Create a context around an existing inspector
    pub fn with_inspector(
        settings: ReleaseSettings,
        env: EnvConfig,
        inspector: GitInspector,
    ) -> Result<Self> {
        let version = settings.version()?;
        let registry = PlaceholderRegistry::with_defaults(&version, &inspector);

        Ok(Self {
            settings,
            env,
            inspector,
            registry,
            version,
            changelog: None,
            staged: None,
            manifests: Vec::new(),
            dispatch: None,
        })
    }

    /// Loaded configuration
    pub fn settings(&self) -> &ReleaseSettings {
        &self.settings
    }

    /// Resolved version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Placeholder registry for this invocation
    pub fn registry(&self) -> &PlaceholderRegistry {
        &self.registry
    }

    /// Version-control metadata
    pub fn inspector(&self) -> &GitInspector {
        &self.inspector
    }

    /// Key of the changelog document, `{project}.md`
    pub fn changelog_product(&self) -> &str {
        self.settings.project_name()
    }

    /// Changelog generator bound to this invocation's registry
    pub fn changelog_generator(&self) -> ChangelogGenerator<'_> {
        ChangelogGenerator::new(
            &self.registry,
            self.inspector.clone(),
            self.settings.repository_url.clone(),
            ChangelogLayout {
                notes_dir: self.settings.notes_dir(),
                boilerplate: self.settings.boilerplate_path(),
                staging_dir: self.settings.staging_dir(),
            },
        )
    }

    /// Render and stage the changelog
    pub fn stage_changelog(&mut self) -> Result<PathBuf> {
        let path = self
            .changelog_generator()
            .stage(self.changelog_product())?;
        self.changelog = Some(path.clone());
        Ok(path)
    }

    /// Resolve every platform's output and copy it into staging
    pub fn collect_artifacts(&mut self) -> Result<&StagingManifest> {
        self.collect_platform_artifacts(None)
    }

    /// Stage the outputs of every platform, or only of the one named
    pub fn collect_platform_artifacts(&mut self, only: Option<&str>) -> Result<&StagingManifest> {
        let platforms = self.settings.selected_platforms(only)?;
        let outputs = artifacts::resolve_outputs(&platforms, &self.settings.root)?;
        let manifest = ArtifactCollector::new(self.settings.staging_dir()).collect(&outputs)?;
        log::info!("Staged {} artifact(s)", manifest.len());
        Ok(self.staged.insert(manifest))
    }

    /// Write one publish manifest per platform
    ///
    /// Artifacts are collected first when this invocation has not staged them.
    pub fn write_publish_manifests(&mut self) -> Result<Vec<PathBuf>> {
        if self.staged.is_none() {
            self.collect_artifacts()?;
        }
        let staged = self.staged.clone().unwrap_or_default();

        let staging_dir = self.settings.staging_dir();
        let changelog = changelog::read_staged(&staging_dir, self.changelog_product());
        let manifests =
            publish::build_manifests(&self.settings, &self.version, &changelog, &staged)?;
        let written = publish::write_manifests(&staging_dir, &manifests)?;

        if publish::has_registry_token(&self.settings, &self.env) {
            log::info!("Registry token found in {}", self.settings.publish.token_env);
        } else {
            log::warn!(
                "{} is not set; the registry upload will be refused",
                self.settings.publish.token_env
            );
        }

        self.manifests = written.clone();
        Ok(written)
    }

    /// Start the release announcement
    pub fn send_notification(&mut self) -> bool {
        let links = notify::platform_links(&self.settings.platforms, &self.registry);
        let notifier = ReleaseNotifier::new(
            self.settings.notify.clone(),
            self.settings.project_name(),
            &self.registry,
            self.env.clone(),
        );
        let handle = notifier.notify(&self.version, &links);
        let dispatched = handle.is_dispatched();
        self.dispatch = Some(handle);
        dispatched
    }

    /// Staged changelog, when this invocation wrote one
    pub fn changelog_path(&self) -> Option<&PathBuf> {
        self.changelog.as_ref()
    }

    /// Artifacts staged by this invocation
    pub fn staged(&self) -> Option<&StagingManifest> {
        self.staged.as_ref()
    }

    /// Publish manifests written by this invocation
    pub fn manifests(&self) -> &[PathBuf] {
        &self.manifests
    }

    /// Take the in-flight notification, if any
    pub fn take_dispatch(&mut self) -> Option<DispatchHandle> {
        self.dispatch.take()
    }
}

impl StepRunner for ReleaseContext {
    fn run_step(&mut self, step: &str) -> Result<()> {
        match step {
            STEP_VERSION => {
                log::info!(
                    "Releasing {} ({} channel)",
                    self.version,
                    self.version.channel()
                );
                Ok(())
            }
            STEP_CHANGELOG => self.stage_changelog().map(|_| ()),
            STEP_COLLECT => self.collect_artifacts().map(|_| ()),
            STEP_PUBLISH => self.write_publish_manifests().map(|_| ()),
            STEP_NOTIFY => {
                self.send_notification();
                Ok(())
            }
            other => Err(CliError::ExecutionFailed {
                command: other.to_string(),
                reason: "no such release step".to_string(),
            }
            .into()),
        }
    }
}
