pub mod accumulate;
pub mod question;
pub mod ranking;
pub mod roster;
pub mod segment;
pub mod stats;

pub use accumulate::{accumulate, Accumulation, RoundRecord};
pub use question::{QuestionType, QuestionTypeMap, TypeLookup};
pub use ranking::{rank_teams, TeamRanking};
pub use roster::{Roster, RosterTeam};
pub use segment::{segment, QuizzerDirectory, QuizzerEntry, RoundGroup, Segmentation};
pub use stats::{StatsMatrix, TypeCounts};

use tracing::info;

use crate::diagnostics::Diagnostics;
use crate::records::{filter_records, EventRecord};

/// Everything one tabulation run produces.
#[derive(Debug, Clone)]
pub struct Tabulation {
    pub directory: QuizzerDirectory,
    /// Rows follow `directory` order
    pub stats: StatsMatrix,
    pub rounds: Vec<RoundRecord>,
    pub rankings: Vec<TeamRanking>,
    pub diagnostics: Diagnostics,
}

/// Run the full pipeline over a fully loaded event stream: filter, segment into
/// confirmed rounds, score, and rank.
///
/// Each call starts from fresh state. Malformed but parseable input produces
/// warnings, never an error.
pub fn tabulate(records: Vec<EventRecord>, types: &QuestionTypeMap, tournament: Option<&str>) -> Tabulation {
    let mut diagnostics = Diagnostics::new();
    let total = records.len();
    let filtered = filter_records(records, tournament);

    if filtered.is_empty() && total > 0 {
        diagnostics.warn(format!(
            "Warning: No records found for tournament {}",
            tournament.unwrap_or("")
        ));
    }
    info!(total, kept = filtered.len(), "Filtered quiz records");

    let seg = segment(filtered);
    diagnostics.merge(seg.diagnostics);
    info!(
        rounds = seg.rounds.len(),
        teams = seg.teams.len(),
        quizzers = seg.directory.len(),
        "Confirmed rounds"
    );

    let acc = accumulate(&seg.rounds, &seg.directory, types);
    diagnostics.merge(acc.diagnostics);

    let rankings = rank_teams(&acc.rounds);
    info!(teams = rankings.len(), "Ranked teams");

    Tabulation {
        directory: seg.directory,
        stats: acc.stats,
        rounds: acc.rounds,
        rankings,
        diagnostics,
    }
}
