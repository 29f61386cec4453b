//! Error types for plugin_release operations.
//!
//! Failures that have a well-defined fallback (version-control metadata,
//! changelog resources, notification delivery) are absorbed by their
//! components and never surface here as release-aborting errors. What remains
//! are the failures with no safe default.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for plugin_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all plugin_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version-control query errors
    #[error("Version control error: {0}")]
    Query(#[from] QueryError),

    /// Changelog resource errors
    #[error("Changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    /// Artifact collection errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Release step graph errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration errors, raised while loading and validating `release.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {path}")]
    NotFound {
        /// Path where the file was expected
        path: PathBuf,
    },

    /// Release candidate counter below zero
    #[error("Release candidate number must be zero or greater, got {value}")]
    NegativeReleaseCandidate {
        /// Rejected value
        value: i64,
    },

    /// Release candidate counter does not fit the version model
    #[error("Release candidate number {value} is out of range")]
    ReleaseCandidateOutOfRange {
        /// Rejected value
        value: i64,
    },

    /// A required field is empty
    #[error("Configuration field '{field}' must not be empty")]
    EmptyField {
        /// Field name
        field: String,
    },

    /// UTC offset could not be parsed
    #[error("Invalid UTC offset '{value}': expected the form +HH:MM or -HH:MM")]
    InvalidOffset {
        /// Rejected value
        value: String,
    },

    /// URL could not be parsed
    #[error("Invalid URL for '{field}': {value}")]
    InvalidUrl {
        /// Field name
        field: String,
        /// Rejected value
        value: String,
    },

    /// Two platforms share a name
    #[error("Platform '{name}' is declared more than once")]
    DuplicatePlatform {
        /// Platform name
        name: String,
    },

    /// Platform not declared in configuration
    #[error("Platform '{name}' is not configured")]
    UnknownPlatform {
        /// Platform name
        name: String,
    },

    /// Timeout that would expire before any work could run
    #[error("Configuration field '{field}' must be at least one second, got {value}")]
    ZeroTimeout {
        /// Field name
        field: String,
        /// Rejected value
        value: u64,
    },
}

/// Version-control query errors
///
/// These never abort a release: [`crate::git::GitInspector`] maps every one
/// of them to the `Unknown` sentinel.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Executable missing or could not be spawned
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Executable not found on PATH
    #[error("Executable '{program}' not found")]
    Unavailable {
        /// Program name
        program: String,
    },

    /// Command exited with a failure status
    #[error("'{command}' exited with status {code:?}: {stderr}")]
    NonZeroExit {
        /// Command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Command did not finish within the configured timeout
    #[error("'{command}' timed out after {timeout:?}")]
    TimedOut {
        /// Command line
        command: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// Command produced no usable output
    #[error("'{command}' produced no output")]
    EmptyOutput {
        /// Command line
        command: String,
    },
}

/// Changelog resource errors
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// Shared boilerplate template missing
    #[error("Changelog boilerplate not found at {path}")]
    MissingBoilerplate {
        /// Expected location
        path: PathBuf,
    },

    /// Resource could not be read
    #[error("Failed to read changelog resource {path}: {source}")]
    Read {
        /// Resource path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Staged changelog could not be written
    #[error("Failed to write changelog to {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Artifact collection errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Platform packaging output is absent
    #[error("Platform '{platform}' produced no output at {path}")]
    Missing {
        /// Platform name
        platform: String,
        /// Expected output path or pattern
        path: PathBuf,
    },

    /// Platform packaging output is empty
    #[error("Platform '{platform}' output is empty (0 bytes): {path}")]
    Empty {
        /// Platform name
        platform: String,
        /// Output path
        path: PathBuf,
    },

    /// Output pattern matched more than one file
    #[error("Platform '{platform}' output pattern '{pattern}' matched {count} files, expected one")]
    Ambiguous {
        /// Platform name
        platform: String,
        /// Glob pattern
        pattern: String,
        /// Number of matches
        count: usize,
    },

    /// Output pattern is not a valid glob
    #[error("Platform '{platform}' has an invalid output pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Platform name
        platform: String,
        /// Glob pattern
        pattern: String,
        /// Parser message
        reason: String,
    },

    /// Two platforms would stage files under the same name
    #[error(
        "Platforms '{first}' and '{second}' both produce '{file}', staging one would overwrite the other"
    )]
    DuplicateDestination {
        /// File name inside the staging directory
        file: String,
        /// Platform staged first
        first: String,
        /// Platform that collides with it
        second: String,
    },

    /// Staging directory could not be created
    #[error("Failed to create staging directory {path}: {source}")]
    StagingDir {
        /// Staging directory
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Copy into the staging directory failed
    #[error("Failed to stage '{platform}' artifact {from} -> {to}: {source}")]
    Copy {
        /// Platform name
        platform: String,
        /// Source path
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Release step graph errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Step declared twice
    #[error("Step '{step}' is declared more than once")]
    DuplicateStep {
        /// Step name
        step: String,
    },

    /// Step depends on a step that was never declared
    #[error("Step '{step}' depends on unknown step '{predecessor}'")]
    UnknownPredecessor {
        /// Step name
        step: String,
        /// Missing predecessor
        predecessor: String,
    },

    /// Steps form a cycle
    #[error("Release steps form a cycle involving '{step}'")]
    Cycle {
        /// A step on the cycle
        step: String,
    },

    /// A required step failed
    #[error("Required step '{step}' failed: {reason}")]
    StepFailed {
        /// Step name
        step: String,
        /// Failure description
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::NotFound { path }) => vec![
                format!("Create a release configuration at {}", path.display()),
                "Pass --config <path> to point at an existing file".to_string(),
            ],
            ReleaseError::Config(ConfigError::NegativeReleaseCandidate { .. }) => vec![
                "Use --rc 0 (or unset RELEASE_RC) for a non-candidate build".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::Missing { platform, .. })
            | ReleaseError::Artifact(ArtifactError::Empty { platform, .. }) => vec![
                format!("Run the packaging task for '{}' before collecting", platform),
                "Check the platform's `output` pattern in the release configuration".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::Ambiguous { platform, .. }) => vec![
                format!("Clean stale outputs for '{}' or narrow its `output` pattern", platform),
            ],
            ReleaseError::Artifact(ArtifactError::DuplicateDestination { first, second, .. }) => {
                vec![format!(
                    "Give the '{}' and '{}' outputs distinct file names (e.g. include the platform in the archive name)",
                    first, second
                )]
            }
            ReleaseError::Config(ConfigError::UnknownPlatform { .. }) => vec![
                "List the platforms declared under [[platforms]] in the release configuration"
                    .to_string(),
            ],
            ReleaseError::Pipeline(PipelineError::StepFailed { step, .. }) => vec![
                format!("Re-run the '{}' step on its own to see the full error", step),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by re-running the release
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Toml(_)
                | ReleaseError::Pipeline(PipelineError::Cycle { .. })
                | ReleaseError::Pipeline(PipelineError::UnknownPredecessor { .. })
                | ReleaseError::Pipeline(PipelineError::DuplicateStep { .. })
        )
    }
}
