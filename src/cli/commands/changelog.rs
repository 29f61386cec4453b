//! Generate and stage the changelog.

use super::helpers::load_context;
use crate::changelog::NO_NOTES;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

/// Execute changelog command
pub(super) fn execute_changelog(args: &Args, config: &RuntimeConfig, print: bool) -> Result<()> {
    let mut context = load_context(args)?;
    let path = context.stage_changelog()?;
    let text = std::fs::read_to_string(&path)?;

    if text == NO_NOTES {
        config.warning_println(&format!(
            "No notes rendered for '{}'; staged the default message",
            context.changelog_product()
        ));
    }
    config.success_println(&format!("Changelog staged at {}", path.display()));

    if print {
        config.println(&text);
    }
    Ok(())
}
