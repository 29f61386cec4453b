//! Shared helpers for command execution.

use crate::cli::{Args, RuntimeConfig};
use crate::config::{EnvConfig, ReleaseSettings};
use crate::error::Result;
use crate::notify::{DispatchHandle, DispatchOutcome};
use crate::pipeline::ReleaseContext;
use std::time::Duration;

/// Load `release.toml`, apply command-line overrides
pub(super) fn load_settings(args: &Args) -> Result<ReleaseSettings> {
    let mut settings = ReleaseSettings::load(&args.config)?;
    settings.apply_overrides(args.snapshot, args.rc)?;
    log::debug!("Loaded release configuration from {}", args.config.display());
    Ok(settings)
}

/// Build the per-invocation release context
pub(super) fn load_context(args: &Args) -> Result<ReleaseContext> {
    let settings = load_settings(args)?;
    ReleaseContext::new(settings, EnvConfig::from_env())
}

/// Wait briefly for an in-flight notification and report how it ended
pub(super) async fn settle_notification(
    handle: Option<DispatchHandle>,
    wait_secs: u64,
    config: &RuntimeConfig,
) {
    let Some(handle) = handle else {
        return;
    };

    match handle.settle(Duration::from_secs(wait_secs)).await {
        DispatchOutcome::Delivered => config.success_println("Release notification delivered"),
        DispatchOutcome::Skipped => {
            config.warning_println("Release notification skipped")
        }
        DispatchOutcome::Failed => {
            config.warning_println("Release notification could not be delivered")
        }
        DispatchOutcome::Pending => config.warning_println(&format!(
            "Release notification still pending after {}s",
            wait_secs
        )),
    }
}
