use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::records::{read_log_file, EventRecord};
use crate::sets::read_set_file;
use crate::tally::QuestionTypeMap;

/// Extension required for quiz log files
pub const LOG_EXTENSION: &str = "csv";
/// Extension required for question set files
pub const SET_EXTENSION: &str = "rtf";

/// Expand user-supplied path arguments into concrete files.
///
/// Each argument may be a single path, a comma-separated list, or a glob
/// pattern. Surrounding quotes left by drag-and-drop are trimmed. Every
/// resulting path must exist and carry `extension`.
pub fn resolve_paths(args: &[String], extension: &str, kind: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for arg in args {
        let arg = arg.trim_matches('\'').trim_matches('"');
        for piece in arg.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if is_glob_pattern(piece) {
                let mut matched = false;
                for entry in glob::glob(piece).with_context(|| format!("Invalid {} pattern: {}", kind, piece))? {
                    let path = entry.with_context(|| format!("Failed to read {} path from {}", kind, piece))?;
                    paths.push(path);
                    matched = true;
                }
                if !matched {
                    anyhow::bail!("No {} files match the pattern: {}", kind, piece);
                }
            } else {
                paths.push(PathBuf::from(piece));
            }
        }
    }

    if paths.is_empty() {
        anyhow::bail!("No {} files given", kind);
    }

    for path in &paths {
        if !path.exists() {
            anyhow::bail!("The path to the {} does not exist: {}", kind, path.display());
        }
        if !has_extension(path, extension) {
            anyhow::bail!("The path to the {} is not a .{} file: {}", kind, extension, path.display());
        }
    }

    debug!(kind, paths = ?paths, "Resolved input paths");
    Ok(paths)
}

fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Read every question-set file into one map.
///
/// A file that cannot be read is reported and skipped. When two files define
/// the same round, the first one read is kept.
pub fn load_question_types(paths: &[PathBuf]) -> (QuestionTypeMap, Diagnostics) {
    let mut types = QuestionTypeMap::new();
    let mut diag = Diagnostics::new();

    for path in paths {
        debug!(path = %path.display(), "Reading question set file");
        match read_set_file(path) {
            Ok((sets, file_diag)) => {
                diag.merge(file_diag);
                for set in sets {
                    let round = set.round.clone();
                    if !types.insert(set.round, set.codes) {
                        diag.warn(format!(
                            "Warning: Duplicate question set number: {}, using only the first.",
                            round
                        ));
                    }
                }
            }
            Err(e) => diag.warn(format!("Warning: Skipping question set file: {:#}", e)),
        }
    }

    info!(sets = types.len(), "Loaded question sets");
    (types, diag)
}

/// Read every quiz log file, concatenating records in file order.
///
/// A file that fails to read is reported and excluded; the rest still load.
pub fn load_records(paths: &[PathBuf]) -> (Vec<EventRecord>, Diagnostics) {
    let mut records = Vec::new();
    let mut diag = Diagnostics::new();

    for path in paths {
        match read_log_file(path) {
            Ok(file_records) => {
                debug!(path = %path.display(), records = file_records.len(), "Read quiz log");
                records.extend(file_records);
            }
            Err(e) => diag.warn(format!("Warning: Skipping quiz log: {:#}", e)),
        }
    }

    info!(records = records.len(), files = paths.len(), "Loaded quiz logs");
    (records, diag)
}
