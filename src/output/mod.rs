pub mod formatter;

pub use formatter::{
    format_individual_results, format_json, format_report, format_round_results, format_team_results,
    format_warnings, should_use_colors, RANKING_EXPLANATION,
};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `content` in one step; readers never see a partial file
pub fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    // Commit the write atomically
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}
