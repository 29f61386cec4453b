//! Stage platform artifacts.

use super::helpers::load_context;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

/// Execute collect command
pub(super) fn execute_collect(
    args: &Args,
    config: &RuntimeConfig,
    platform: Option<&str>,
) -> Result<()> {
    let mut context = load_context(args)?;
    let manifest = context.collect_platform_artifacts(platform)?;

    if manifest.is_empty() {
        config.warning_println("No platforms configured; nothing was staged");
        return Ok(());
    }

    config.success_println(&format!("Staged {} artifact(s)", manifest.len()));
    for (platform, path) in &manifest.artifacts {
        config.indent(&format!("{}: {}", platform, path.display()));
    }
    Ok(())
}
