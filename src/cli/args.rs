//! Command line argument parsing and validation.
//!
//! Every subcommand reads `release.toml` (or `--config`). The snapshot flag and
//! release-candidate counter can be overridden per invocation, from flags or
//! from `RELEASE_SNAPSHOT` / `RELEASE_RC`.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::CliError;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release pipeline for multi-platform plugin distributions
#[derive(Parser, Debug)]
#[command(
    name = "plugin_release",
    version,
    about = "Release pipeline for multi-platform plugin distributions",
    long_about = "Resolve release versions, render changelogs, stage platform artifacts,
write registry publish manifests and announce releases.

Usage:
  plugin_release version
  plugin_release --rc 2 changelog
  plugin_release --snapshot release
  plugin_release --config path/to/release.toml render template.md"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Release configuration file
    #[arg(long, short = 'c', global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Build a snapshot (overrides the configuration)
    #[arg(
        long,
        global = true,
        env = "RELEASE_SNAPSHOT",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub snapshot: Option<bool>,

    /// Release-candidate number, 0 for none (overrides the configuration)
    #[arg(long, global = true, env = "RELEASE_RC", allow_negative_numbers = true)]
    pub rc: Option<i64>,

    /// Show extra detail
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the resolved version
    Version,

    /// Substitute placeholders in a template file
    Render {
        /// Template to render
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render and stage the changelog
    Changelog {
        /// Also print the rendered changelog
        #[arg(long)]
        print: bool,
    },

    /// Stage every platform's packaged artifact
    Collect {
        /// Only stage this platform
        #[arg(long, short = 'p', value_name = "NAME")]
        platform: Option<String>,
    },

    /// Write per-platform registry publish manifests
    Publish,

    /// Announce the release
    Notify {
        /// Seconds to wait for delivery before exiting
        #[arg(long, default_value_t = 10)]
        wait_secs: u64,
    },

    /// Run the full release
    Release {
        /// Seconds to wait for the notification before exiting
        #[arg(long, default_value_t = 10)]
        wait_secs: u64,
    },
}

impl Command {
    /// Subcommand name, for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Version => "version",
            Command::Render { .. } => "render",
            Command::Changelog { .. } => "changelog",
            Command::Collect { .. } => "collect",
            Command::Publish => "publish",
            Command::Notify { .. } => "notify",
            Command::Release { .. } => "release",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if self.verbose && self.quiet {
            return Err(CliError::InvalidArguments {
                reason: "--verbose and --quiet cannot be used together".to_string(),
            });
        }

        match &self.command {
            Command::Render { file, .. } if file.as_os_str().is_empty() => {
                Err(CliError::InvalidArguments {
                    reason: "Template path must not be empty".to_string(),
                })
            }
            Command::Collect {
                platform: Some(name),
            } if name.trim().is_empty() => Err(CliError::InvalidArguments {
                reason: "--platform must name a configured platform".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
