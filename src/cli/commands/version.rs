//! Print the resolved release version.

use super::helpers::load_settings;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

/// Execute version command
pub(super) fn execute_version(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let settings = load_settings(args)?;
    let version = settings.version()?;

    config.println(&version.to_string());
    config.verbose_println(&format!("Channel: {}", version.channel()));
    config.verbose_println(&format!("Registry version type: {}", version.version_type().as_str()));
    config.verbose_println(&format!("Name: {}", version.display_name(settings.project_name())));
    Ok(())
}
