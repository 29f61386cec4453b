//! # Plugin Release
//!
//! Release pipeline for a plugin distributed across several platform targets.
//!
//! A release resolves one version string, renders changelog documents through
//! a placeholder registry fed by version-control metadata, stages each
//! platform's packaged artifact, writes the package-registry publish contract
//! and announces the release to a chat webhook.
//!
//! ## Features
//!
//! - **Deterministic versions**: `{product}+{target}[-RC{n}][-SNAPSHOT]`
//! - **Graceful metadata**: version-control failures become `Unknown`, never errors
//! - **Lazy placeholders**: each `{{key}}` resolved at most once per render
//! - **Step graph**: required steps abort, optional steps degrade
//!
//! ## Usage
//!
//! ```bash
//! plugin_release version               # Print the resolved version
//! plugin_release --rc 1 changelog      # Stage the changelog for RC1
//! plugin_release --snapshot release    # Run the whole release
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod artifacts;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod notify;
pub mod pipeline;
pub mod placeholder;
pub mod publish;
pub mod version;

pub use artifacts::{ArtifactCollector, StagingManifest};
pub use changelog::{ChangelogGenerator, NO_NOTES, NotesLookup};
pub use cli::Args;
pub use config::{EnvConfig, ReleaseSettings};
pub use error::{ReleaseError, Result};
pub use git::{GitInspector, ProcessRunner, UNKNOWN, VersionControlQuery};
pub use notify::{DispatchHandle, DispatchOutcome, ReleaseNotifier};
pub use pipeline::{ReleaseContext, Step, StepGraph};
pub use placeholder::PlaceholderRegistry;
pub use publish::PublishManifest;
pub use version::{Version, VersionType};
