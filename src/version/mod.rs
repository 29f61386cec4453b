//! Canonical version identifiers for plugin releases.
//!
//! A version is composed from four inputs: the product identifier, the target
//! platform identifier, the snapshot flag and the release-candidate counter.
//! It renders as `{product}+{target}[-RC{n}][-SNAPSHOT]`.

use serde::Serialize;
use std::fmt;

/// Suffix appended to snapshot builds
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Release classification of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Channel {
    /// Final release
    Release,
    /// Numbered release candidate
    ReleaseCandidate(u32),
    /// Development snapshot
    Snapshot,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Release => write!(f, "release"),
            Channel::ReleaseCandidate(n) => write!(f, "release candidate {}", n),
            Channel::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Registry-facing release flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    /// Stable release
    Release,
    /// Anything that is not a stable release
    Beta,
}

impl VersionType {
    /// Wire name used by package registries
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Release => "release",
            VersionType::Beta => "beta",
        }
    }
}

/// Resolved release version
///
/// Immutable; derive a new one instead of mutating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    product: String,
    platform_target: String,
    snapshot: bool,
    rc: u32,
}

impl Version {
    /// Compose a version from its four inputs
    pub fn new(
        product: impl Into<String>,
        platform_target: impl Into<String>,
        snapshot: bool,
        rc: u32,
    ) -> Self {
        Self {
            product: product.into(),
            platform_target: platform_target.into(),
            snapshot,
            rc,
        }
    }

    /// Product identifier
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Target platform identifier
    pub fn platform_target(&self) -> &str {
        &self.platform_target
    }

    /// Release-candidate counter (0 when not a candidate)
    pub fn rc(&self) -> u32 {
        self.rc
    }

    /// Active channel. Snapshot wins when both flags are set.
    pub fn channel(&self) -> Channel {
        if self.snapshot {
            Channel::Snapshot
        } else if self.rc > 0 {
            Channel::ReleaseCandidate(self.rc)
        } else {
            Channel::Release
        }
    }

    /// A build is a release iff it is neither a snapshot nor a candidate
    pub fn is_release(&self) -> bool {
        !self.snapshot && self.rc == 0
    }

    /// Registry release flag derived from [`Version::is_release`]
    pub fn version_type(&self) -> VersionType {
        if self.is_release() {
            VersionType::Release
        } else {
            VersionType::Beta
        }
    }

    /// Human-readable name, e.g. `Impactor 5.1.0+1.20.1`
    pub fn display_name(&self, project: &str) -> String {
        format!("{} {}", project, self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.product, self.platform_target)?;
        if self.rc > 0 {
            write!(f, "-RC{}", self.rc)?;
        }
        if self.snapshot {
            f.write_str(SNAPSHOT_SUFFIX)?;
        }
        Ok(())
    }
}

/// Render the canonical version string for the given inputs
pub fn resolve(product: &str, platform_target: &str, snapshot: bool, rc: u32) -> String {
    Version::new(product, platform_target, snapshot, rc).to_string()
}
