//! Write registry publish manifests.

use super::helpers::load_context;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

/// Execute publish command
pub(super) fn execute_publish(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let mut context = load_context(args)?;
    let written = context.write_publish_manifests()?;

    config.success_println(&format!(
        "Wrote {} publish manifest(s) for {}",
        written.len(),
        context.version()
    ));
    for path in &written {
        config.indent(&path.display().to_string());
    }
    Ok(())
}
