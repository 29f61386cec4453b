//! Run the full release graph.

use super::helpers::{load_context, settle_notification};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{StepStatus, release_graph};

/// Execute release command
pub(super) async fn execute_release(
    args: &Args,
    config: &RuntimeConfig,
    wait_secs: u64,
) -> Result<()> {
    let mut context = load_context(args)?;
    let graph = release_graph()?;

    config.section(&format!("Releasing {}", context.version()));
    // Steps spawn git and copy files; keep them off the async workers
    let report = tokio::task::block_in_place(|| graph.execute(&mut context));
    settle_notification(context.take_dispatch(), wait_secs, config).await;
    let report = report?;

    for step in &report.steps {
        match &step.status {
            StepStatus::Succeeded => config.indent(&format!("✓ {}", step.name)),
            StepStatus::Degraded(reason) => config.indent(&format!("⚠ {} ({})", step.name, reason)),
        }
    }

    if let Some(path) = context.changelog_path() {
        config.verbose_println(&format!("Changelog: {}", path.display()));
    }
    for path in context.manifests() {
        config.verbose_println(&format!("Manifest: {}", path.display()));
    }
    Ok(())
}
