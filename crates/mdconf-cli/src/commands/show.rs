//! CLI handler for `mdconf show`.

use std::path::Path;

use anyhow::Result;
use mdconf_config::ShowFormat;
use tracing::debug;

use crate::OutputFormat;

/// Print the resolved configuration.
pub(crate) fn show_config(file: &Path, format: OutputFormat, state_dir: Option<&Path>) -> Result<()> {
    let resolved = mdconf_config::load(file, state_dir)?;
    debug!(
        file = %file.display(),
        servers = resolved.servers.len(),
        domains = resolved.domains().len(),
        "resolved configuration"
    );

    let output = resolved
        .show(parse_format(format))
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

fn parse_format(format: OutputFormat) -> ShowFormat {
    match format {
        OutputFormat::Toml => ShowFormat::Toml,
        OutputFormat::Json => ShowFormat::Json,
    }
}
