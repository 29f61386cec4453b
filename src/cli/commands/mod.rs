//! Command execution.
//!
//! Each subcommand runs one slice of the release (or, for `release`, the
//! whole step graph). Failures are reported here and turned into exit codes.

mod changelog;
mod collect;
mod helpers;
mod notify;
mod publish;
mod release;
mod render;
mod version;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use changelog::execute_changelog;
use collect::execute_collect;
use notify::execute_notify;
use publish::execute_publish;
use release::execute_release;
use render::execute_render;
use version::execute_version;

/// Execute the selected command, returning the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&validation_error.to_string());
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Version => execute_version(&args, &config),
        Command::Render { file, output } => {
            execute_render(&args, &config, file, output.as_deref())
        }
        Command::Changelog { print } => execute_changelog(&args, &config, *print),
        Command::Collect { platform } => execute_collect(&args, &config, platform.as_deref()),
        Command::Publish => execute_publish(&args, &config),
        Command::Notify { wait_secs } => execute_notify(&args, &config, *wait_secs).await,
        Command::Release { wait_secs } => execute_release(&args, &config, *wait_secs).await,
    };

    match result {
        Ok(()) => {
            if !matches!(args.command, Command::Version | Command::Render { output: None, .. }) {
                config.success_println(&format!(
                    "Command '{}' completed successfully",
                    args.command.name()
                ));
            }
            Ok(0)
        }
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
