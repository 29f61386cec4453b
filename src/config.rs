//! Release configuration loaded from `release.toml`.
//!
//! Relative paths in the file are resolved against the directory that holds
//! it. Snapshot and release-candidate flags can be overridden from the command
//! line or environment; the release-candidate counter is validated here, at
//! the boundary, so everything downstream works with a non-negative `u32`.

use crate::error::{ConfigError, Result};
use crate::version::Version;
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Boilerplate file name inside the changelog directory
pub const DEFAULT_BOILERPLATE: &str = "boilerplate.md";

/// Top-level release configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSettings {
    /// Product identifier (first version component)
    pub product: String,
    /// Target platform identifier (second version component)
    pub platform_target: String,
    /// Build a snapshot
    #[serde(default)]
    pub snapshot: bool,
    /// Release-candidate counter, 0 for none
    #[serde(default)]
    pub rc: i64,
    /// Display name of the project (defaults to `product`)
    #[serde(default)]
    pub project_name: Option<String>,
    /// Hosting project URL, used for history comparison links
    pub repository_url: String,
    /// Build output root; staging lives in `{build_dir}/deploy`
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Directory holding per-product notes (`{product}.md`)
    #[serde(default = "default_changelog_dir")]
    pub changelog_dir: PathBuf,
    /// Shared boilerplate (defaults to `{changelog_dir}/boilerplate.md`)
    #[serde(default)]
    pub boilerplate: Option<PathBuf>,
    /// Version-control settings
    #[serde(default)]
    pub git: GitSettings,
    /// Release notification settings
    #[serde(default)]
    pub notify: NotifySettings,
    /// Package registry settings
    #[serde(default)]
    pub publish: PublishSettings,
    /// Platforms that make up a release
    #[serde(default)]
    pub platforms: Vec<PlatformSettings>,
    /// Directory the configuration was loaded from
    #[serde(skip)]
    pub root: PathBuf,
}

/// Version-control settings
#[derive(Debug, Clone, Deserialize)]
pub struct GitSettings {
    /// Executable to run
    #[serde(default = "default_git_program")]
    pub program: String,
    /// Per-query timeout in seconds
    #[serde(default = "default_git_timeout")]
    pub timeout_secs: u64,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: default_git_program(),
            timeout_secs: default_git_timeout(),
        }
    }
}

impl GitSettings {
    /// Per-query timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Release notification settings
///
/// `title`, `description` and platform download URLs may contain placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySettings {
    /// Environment variable holding the webhook URL
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,
    /// Sender name shown by the chat service
    #[serde(default)]
    pub username: Option<String>,
    /// Sender avatar
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Message title
    #[serde(default = "default_title")]
    pub title: String,
    /// One-line release description
    #[serde(default = "default_description")]
    pub description: String,
    /// Embed accent colour
    #[serde(default = "default_color")]
    pub color: u32,
    /// Offset used for the message timestamp, e.g. `-05:00`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            webhook_env: default_webhook_env(),
            username: None,
            avatar_url: None,
            title: default_title(),
            description: default_description(),
            color: default_color(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl NotifySettings {
    /// Parsed timestamp offset
    pub fn offset(&self) -> std::result::Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset)
    }
}

/// Package registry settings
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSettings {
    /// Registry project identifier (defaults to the project name)
    #[serde(default)]
    pub project_id: Option<String>,
    /// Environment variable holding the registry token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            token_env: default_token_env(),
        }
    }
}

/// One platform of a release
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    /// Platform key, e.g. `fabric`
    pub name: String,
    /// Display label (defaults to the key)
    #[serde(default)]
    pub label: Option<String>,
    /// Packaging task that produces the output
    pub task: String,
    /// Glob, relative to the configuration root, matching the one output file
    pub output: String,
    /// Loader identifiers for the registry (defaults to `[name]`)
    #[serde(default)]
    pub loaders: Vec<String>,
    /// Published download location
    #[serde(default)]
    pub download_url: Option<String>,
}

impl PlatformSettings {
    /// Display label
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Loader identifiers
    pub fn loaders(&self) -> Vec<String> {
        if self.loaders.is_empty() {
            vec![self.name.clone()]
        } else {
            self.loaders.clone()
        }
    }
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_changelog_dir() -> PathBuf {
    PathBuf::from("changelogs")
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_git_timeout() -> u64 {
    10
}

fn default_webhook_env() -> String {
    "DISCORD_WEBHOOK".to_string()
}

fn default_title() -> String {
    "{{version}} released".to_string()
}

fn default_description() -> String {
    "A new release is now available for download.".to_string()
}

fn default_color() -> u32 {
    0x2ECC71
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_token_env() -> String {
    "MODRINTH_GRADLE_TOKEN".to_string()
}

impl ReleaseSettings {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read release configuration {}", path.display()))?;
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml(&content, root)
    }

    /// Parse and validate configuration text, resolving paths against `root`
    pub fn from_toml(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut settings: ReleaseSettings = toml::from_str(content)?;
        settings.root = root.into();
        settings.repository_url = settings.repository_url.trim_end_matches('/').to_string();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply command-line overrides, then re-validate
    pub fn apply_overrides(
        &mut self,
        snapshot: Option<bool>,
        rc: Option<i64>,
    ) -> std::result::Result<(), ConfigError> {
        if let Some(snapshot) = snapshot {
            self.snapshot = snapshot;
        }
        if let Some(rc) = rc {
            self.rc = rc;
        }
        self.validate()
    }

    /// Check invariants the rest of the pipeline relies on
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (field, value) in [
            ("product", &self.product),
            ("platform_target", &self.platform_target),
            ("repository_url", &self.repository_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: field.to_string(),
                });
            }
        }

        self.rc_number()?;

        if self.git.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "git.timeout_secs".to_string(),
                value: self.git.timeout_secs,
            });
        }

        if url::Url::parse(&self.repository_url).is_err() {
            return Err(ConfigError::InvalidUrl {
                field: "repository_url".to_string(),
                value: self.repository_url.clone(),
            });
        }

        self.notify.offset()?;

        let mut seen = HashSet::new();
        for platform in &self.platforms {
            if platform.name.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: "platforms.name".to_string(),
                });
            }
            if !seen.insert(platform.name.as_str()) {
                return Err(ConfigError::DuplicatePlatform {
                    name: platform.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Release-candidate counter, rejected when negative
    pub fn rc_number(&self) -> std::result::Result<u32, ConfigError> {
        if self.rc < 0 {
            return Err(ConfigError::NegativeReleaseCandidate { value: self.rc });
        }
        u32::try_from(self.rc)
            .map_err(|_| ConfigError::ReleaseCandidateOutOfRange { value: self.rc })
    }

    /// Resolved release version
    pub fn version(&self) -> std::result::Result<Version, ConfigError> {
        Ok(Version::new(
            self.product.clone(),
            self.platform_target.clone(),
            self.snapshot,
            self.rc_number()?,
        ))
    }

    /// Project display name
    pub fn project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or(&self.product)
    }

    /// Registry project identifier
    pub fn project_id(&self) -> &str {
        self.publish
            .project_id
            .as_deref()
            .unwrap_or_else(|| self.project_name())
    }

    /// Resolve a configured path against the configuration root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Absolute build output root
    pub fn build_root(&self) -> PathBuf {
        self.resolve_path(&self.build_dir)
    }

    /// Staging directory, `{build_dir}/deploy`
    pub fn staging_dir(&self) -> PathBuf {
        self.build_root().join("deploy")
    }

    /// Directory holding per-product notes
    pub fn notes_dir(&self) -> PathBuf {
        self.resolve_path(&self.changelog_dir)
    }

    /// Shared boilerplate location
    pub fn boilerplate_path(&self) -> PathBuf {
        match &self.boilerplate {
            Some(path) => self.resolve_path(path),
            None => self.notes_dir().join(DEFAULT_BOILERPLATE),
        }
    }

    /// Platforms to act on: all of them, or the one named
    pub fn selected_platforms(
        &self,
        only: Option<&str>,
    ) -> std::result::Result<Vec<PlatformSettings>, ConfigError> {
        match only {
            Some(name) => Ok(vec![self.platform(name)?.clone()]),
            None => Ok(self.platforms.clone()),
        }
    }

    /// Look up a platform by key
    pub fn platform(&self, name: &str) -> std::result::Result<&PlatformSettings, ConfigError> {
        self.platforms
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownPlatform {
                name: name.to_string(),
            })
    }
}

/// Parse `+HH:MM` / `-HH:MM` into a fixed offset
pub fn parse_utc_offset(value: &str) -> std::result::Result<FixedOffset, ConfigError> {
    value
        .trim()
        .parse::<FixedOffset>()
        .map_err(|_| ConfigError::InvalidOffset {
            value: value.to_string(),
        })
}

/// Snapshot of the process environment
///
/// Credentials are looked up here at dispatch time rather than stored in
/// configuration files.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build an environment from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
