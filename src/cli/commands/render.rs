//! Substitute placeholders in an arbitrary template.

use super::helpers::load_context;
use crate::cli::{Args, RuntimeConfig};
use crate::error::{CliError, Result};
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Execute render command
pub(super) fn execute_render(
    args: &Args,
    config: &RuntimeConfig,
    file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let template = std::fs::read_to_string(file).map_err(|e| CliError::ExecutionFailed {
        command: "render".to_string(),
        reason: format!("Cannot read template {}: {}", file.display(), e),
    })?;

    let context = load_context(args)?;
    let rendered = context.registry().substitute(&template);

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write rendered output {}", path.display()))?;
            config.success_println(&format!("Rendered {} -> {}", file.display(), path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
