use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::IsTerminal;

use crate::diagnostics::Diagnostics;
use crate::records::strip_quotes;
use crate::tally::{QuestionType, QuizzerDirectory, RoundRecord, StatsMatrix, Tabulation, TeamRanking, TypeCounts};

/// Explanation printed above the ranking table
pub const RANKING_EXPLANATION: &str =
    "Teams are ranked first by number of losses, then by number of wins, then by head-to-head record. ";

/// Render table rows, one per line.
///
/// Single-byte delimiters go through the csv writer so a name containing the
/// delimiter is quoted instead of shifting the columns after it.
fn delimited_rows(rows: &[Vec<String>], delim: &str) -> String {
    match delim.as_bytes() {
        [byte] => write_csv_rows(rows, *byte).unwrap_or_else(|_| join_rows(rows, delim)),
        _ => join_rows(rows, delim),
    }
}

fn write_csv_rows(rows: &[Vec<String>], delimiter: u8) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush table: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn join_rows(rows: &[Vec<String>], delim: &str) -> String {
    rows.iter().map(|row| format!("{}\n", row.join(delim))).collect()
}

/// Question types to print, in fixed A..M order. An empty selection means all.
fn selected_types(selection: &[QuestionType]) -> Vec<QuestionType> {
    QuestionType::ALL
        .iter()
        .copied()
        .filter(|t| selection.is_empty() || selection.contains(t))
        .collect()
}

/// Per-quizzer statistics table: a header row, then one row per quizzer in
/// directory order.
pub fn format_individual_results(
    directory: &QuizzerDirectory,
    stats: &StatsMatrix,
    selection: &[QuestionType],
    delim: &str,
) -> String {
    let types = selected_types(selection);

    let mut header = vec!["Quizzer".to_string(), "Team".to_string()];
    for t in &types {
        header.push(format!("{} Attempted", t));
        header.push(format!("{} Correct", t));
        header.push(format!("{} Bonuses Attempted", t));
        header.push(format!("{} Bonuses Correct", t));
    }

    let mut rows = vec![header];
    for (i, entry) in directory.entries().iter().enumerate() {
        let mut row = vec![
            strip_quotes(&entry.name).to_string(),
            strip_quotes(&entry.team).to_string(),
        ];
        for t in &types {
            let counts = stats.get(i, *t);
            row.push(counts.attempted.to_string());
            row.push(counts.correct.to_string());
            row.push(counts.bonus_attempted.to_string());
            row.push(counts.bonus_correct.to_string());
        }
        rows.push(row);
    }

    delimited_rows(&rows, delim)
}

/// Per-round score breakdown
pub fn format_round_results(rounds: &[RoundRecord], delim: &str) -> String {
    let mut result = String::from("Individual Round Results\n\n");
    for round in rounds {
        result.push_str(&format!("Room: {}{} Round: {}\n", round.room, delim, round.round));
        for (name, score) in round.team_names.iter().zip(&round.team_scores) {
            result.push_str(&format!("{}{} {}\n", name, delim, score));
        }
        result.push('\n');
    }
    result.push('\n');
    result
}

/// Team section: optional round breakdown, then the ranking table
pub fn format_team_results(
    rounds: &[RoundRecord],
    rankings: &[TeamRanking],
    delim: &str,
    display_rounds: bool,
) -> String {
    let mut result = String::new();

    if display_rounds {
        result.push_str(&format_round_results(rounds, delim));
    }

    result.push_str("Team Results\n\n");
    result.push_str(RANKING_EXPLANATION);
    result.push_str("\n\n");

    let header = ["Name", "Placement", "Wins", "Losses", "Total Score"].map(String::from).to_vec();
    let mut rows = vec![header];
    for ranking in rankings {
        rows.push(vec![
            strip_quotes(&ranking.name).to_string(),
            ranking.placement.to_string(),
            ranking.wins.to_string(),
            ranking.losses.to_string(),
            ranking.total_score.to_string(),
        ]);
    }
    result.push_str(&delimited_rows(&rows, delim));

    result
}

/// Full text report: individual table, a blank line, then the team section
pub fn format_report(
    tabulation: &Tabulation,
    selection: &[QuestionType],
    delim: &str,
    display_rounds: bool,
) -> String {
    format!(
        "{}\n{}",
        format_individual_results(&tabulation.directory, &tabulation.stats, selection, delim),
        format_team_results(&tabulation.rounds, &tabulation.rankings, delim, display_rounds)
    )
}

#[derive(Debug, Serialize)]
struct QuizzerReport<'a> {
    name: &'a str,
    team: &'a str,
    /// Keyed by question-type code
    stats: BTreeMap<String, TypeCounts>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    quizzers: Vec<QuizzerReport<'a>>,
    rounds: &'a [RoundRecord],
    rankings: &'a [TeamRanking],
    warnings: &'a Diagnostics,
}

/// The whole run as one pretty-printed JSON document
pub fn format_json(
    tabulation: &Tabulation,
    selection: &[QuestionType],
    warnings: &Diagnostics,
) -> serde_json::Result<String> {
    let types = selected_types(selection);
    let quizzers = tabulation
        .directory
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| QuizzerReport {
            name: strip_quotes(&entry.name),
            team: strip_quotes(&entry.team),
            stats: types
                .iter()
                .map(|t| (t.to_string(), tabulation.stats.get(i, *t)))
                .collect(),
        })
        .collect();

    let report = JsonReport {
        quizzers,
        rounds: &tabulation.rounds,
        rankings: &tabulation.rankings,
        warnings,
    };
    serde_json::to_string_pretty(&report)
}

/// One warning per line, yellow when colours are on
pub fn format_warnings(warnings: &Diagnostics, use_colors: bool) -> String {
    warnings
        .iter()
        .map(|w| {
            if use_colors {
                w.yellow().to_string()
            } else {
                w.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if stderr is a TTY (warnings go there)
pub fn should_use_colors() -> bool {
    std::io::stderr().is_terminal()
}
