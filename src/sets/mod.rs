use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::diagnostics::Diagnostics;

/// Question codes for one set, in question order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    /// Round id from the `SET #<id>` heading; empty if the file had none
    pub round: String,
    pub codes: Vec<char>,
}

fn set_heading() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"SET #([A-Za-z0-9]+)").expect("set heading pattern is valid"))
}

/// Extract question-type codes from the text of an RTF question-set file.
///
/// The file is split on `\tab` control words. Every even-numbered segment
/// ends with a question's type code followed by one formatting character, so
/// its second-to-last character is taken. A `SET #<id>` heading starts a new
/// set; a file may hold several. Anything before the first heading is RTF
/// preamble and is ignored.
pub fn parse_question_sets(content: &str) -> (Vec<QuestionSet>, Diagnostics) {
    let mut sets = Vec::new();
    let mut diag = Diagnostics::new();
    let mut current: Option<QuestionSet> = None;

    for (i, part) in content.split("\\tab").enumerate() {
        if let Some(id) = set_heading().captures(part).and_then(|c| c.get(1)) {
            let next = QuestionSet {
                round: id.as_str().to_string(),
                codes: Vec::new(),
            };
            if let Some(finished) = current.replace(next) {
                if !finished.codes.is_empty() {
                    sets.push(finished);
                }
            }
        }

        if i % 2 == 0 {
            if let Some(set) = current.as_mut() {
                let chars: Vec<char> = part.chars().collect();
                if chars.len() > 1 {
                    set.codes.push(chars[chars.len() - 2]);
                }
            }
        }
    }

    match current {
        Some(set) => sets.push(set),
        None => diag.warn(
            "Warning: RTF question set file might have been formatted incorrectly. Please use only the original RTF files!",
        ),
    }

    (sets, diag)
}

/// Read and parse one question-set file
pub fn read_set_file(path: &Path) -> Result<(Vec<QuestionSet>, Diagnostics)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question set file at {}", path.display()))?;
    Ok(parse_question_sets(&content))
}
