//! Announce the release.

use super::helpers::{load_context, settle_notification};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

/// Execute notify command
///
/// Delivery problems are reported but never fail the command.
pub(super) async fn execute_notify(
    args: &Args,
    config: &RuntimeConfig,
    wait_secs: u64,
) -> Result<()> {
    let mut context = load_context(args)?;
    config.verbose_println(&format!("Announcing {}", context.version()));
    context.send_notification();
    settle_notification(context.take_dispatch(), wait_secs, config).await;
    Ok(())
}
