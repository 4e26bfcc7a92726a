use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::schema::Config;
use crate::output::write_atomically;

/// Write a starter config file listing every option with its default.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }

    let yaml = serde_saphyr::to_string(&Config::starter())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
    let content = format!(
        "# quiz-tally configuration. Command line flags override these values.\n{}",
        yaml
    );

    write_atomically(path, &content)
}
