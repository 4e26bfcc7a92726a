use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use super::types::EventRecord;

/// Read every line of a quiz log CSV file.
///
/// Logs carry no header row and lines vary in length, so the reader is
/// configured to be flexible. Event filtering happens later in `filter_records`.
pub fn read_log_file(path: &Path) -> Result<Vec<EventRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open quiz log at {}", path.display()))?;
    parse_log(file).with_context(|| format!("Quiz log contains formatting error: {}", path.display()))
}

/// Parse log lines from any reader
pub fn parse_log<R: Read>(input: R) -> Result<Vec<EventRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.context("Failed to read log line")?;
        records.push(EventRecord::from_fields(row.iter()));
    }
    Ok(records)
}

/// Keep only tabulated event codes, and only lines for `tournament` when given.
///
/// An empty tournament name means no tournament filter.
pub fn filter_records(records: Vec<EventRecord>, tournament: Option<&str>) -> Vec<EventRecord> {
    let tournament = tournament.filter(|t| !t.is_empty());
    records
        .into_iter()
        .filter(|r| tournament.map_or(true, |t| r.tournament == t))
        .filter(|r| r.code.is_tabulated())
        .collect()
}
