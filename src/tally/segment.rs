use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::roster::{Roster, RosterTeam};
use crate::diagnostics::Diagnostics;
use crate::records::types::round_key;
use crate::records::EventRecord;

/// A confirmed round: its roster snapshot and scoring events in log order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundGroup {
    /// `Rm<room>Rd<round>`
    pub key: String,
    pub room: String,
    pub round: String,
    pub teams: Vec<RosterTeam>,
    pub events: Vec<EventRecord>,
}

/// A quizzer and the team they were first confirmed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizzerEntry {
    pub name: String,
    pub team: String,
}

/// Run-wide quizzer -> team directory. Indices are assigned in registration
/// order and never change.
#[derive(Debug, Clone, Default)]
pub struct QuizzerDirectory {
    entries: Vec<QuizzerEntry>,
    index: HashMap<String, usize>,
}

impl QuizzerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quizzer. The first team seen wins; returns false if the
    /// name was already known.
    pub fn register(&mut self, name: &str, team: &str) -> bool {
        if name.is_empty() || self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(QuizzerEntry {
            name: name.to_string(),
            team: team.to_string(),
        });
        true
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn team_of(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].team.as_str())
    }

    pub fn entries(&self) -> &[QuizzerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of round segmentation.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Confirmed rounds in the order they were first seen
    pub rounds: Vec<RoundGroup>,
    pub directory: QuizzerDirectory,
    /// Every confirmed team name, in first-seen order
    pub teams: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// The round currently being read from the stream
struct OpenRound {
    room: String,
    round: String,
    roster: Roster,
    events: Vec<EventRecord>,
    /// Set by any scoring event; only rounds with action are confirmed
    action: bool,
}

impl OpenRound {
    fn new(room: &str, round: &str) -> Self {
        Self {
            room: room.to_string(),
            round: round.to_string(),
            roster: Roster::new(),
            events: Vec::new(),
            action: false,
        }
    }

    fn is_same_round(&self, record: &EventRecord) -> bool {
        self.room == record.room && self.round == record.round
    }
}

/// Split the filtered event stream into confirmed rounds.
///
/// Any change of room or round closes the current round. A closed round is kept
/// only if a scoring event happened in it; rounds holding nothing but team and
/// quizzer names are practice or setup leftovers and are dropped.
pub fn segment(records: Vec<EventRecord>) -> Segmentation {
    let mut seg = Segmentation::default();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut open = OpenRound::new("", "");

    for record in records {
        if !open.is_same_round(&record) {
            let next = OpenRound::new(&record.room, &record.round);
            close_round(std::mem::replace(&mut open, next), &mut seg, &mut positions);
        }

        if record.code.is_scoring() {
            open.action = true;
            open.events.push(record);
        } else {
            open.roster.apply(&record);
        }
    }
    close_round(open, &mut seg, &mut positions);

    debug!(
        rounds = seg.rounds.len(),
        teams = seg.teams.len(),
        quizzers = seg.directory.len(),
        "Segmentation complete"
    );
    seg
}

fn close_round(open: OpenRound, seg: &mut Segmentation, positions: &mut HashMap<String, usize>) {
    let key = round_key(&open.room, &open.round);
    if !open.action {
        if !open.roster.is_empty() {
            debug!(round = %key, "Discarding round with no scoring action");
        }
        return;
    }

    let teams = open.roster.into_confirmed();
    for team in &teams {
        if !seg.teams.contains(&team.name) {
            seg.teams.push(team.name.clone());
        }
        for quizzer in &team.quizzers {
            seg.directory.register(quizzer, &team.name);
        }
    }

    debug!(
        round = %key,
        teams = ?teams.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        events = open.events.len(),
        "Confirmed round"
    );

    let group = RoundGroup {
        key: key.clone(),
        room: open.room,
        round: open.round,
        teams,
        events: open.events,
    };

    match positions.get(&key) {
        Some(&i) => {
            seg.diagnostics
                .warn(format!("Warning: Duplicate round number: {}, overwriting!", key));
            seg.rounds[i] = group;
        }
        None => {
            positions.insert(key, seg.rounds.len());
            seg.rounds.push(group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::types::fixtures::{event, quizzer_name, team_name};
    use crate::records::EventCode;

    fn seated_round(room: &str, round: &str) -> Vec<EventRecord> {
        vec![
            team_name(room, round, 0, "Eagles"),
            quizzer_name(room, round, 0, 0, "Alice"),
            quizzer_name(room, round, 0, 1, "Bob"),
            team_name(room, round, 1, "Hawks"),
            quizzer_name(room, round, 1, 0, "Carol"),
        ]
    }

    #[test]
    fn test_round_with_action_is_confirmed() {
        let mut records = seated_round("1", "1");
        records.push(event("1", "1", 1, "Alice", 0, EventCode::Correct));
        let seg = segment(records);

        assert_eq!(seg.rounds.len(), 1);
        let round = &seg.rounds[0];
        assert_eq!(round.key, "Rm1Rd1");
        assert_eq!(round.teams.len(), 2);
        assert_eq!(round.events.len(), 1);
        assert_eq!(seg.teams, vec!["Eagles", "Hawks"]);
        assert_eq!(seg.directory.len(), 3);
        assert_eq!(seg.directory.team_of("Carol"), Some("Hawks"));
    }

    #[test]
    fn test_identity_only_round_is_discarded() {
        let mut records = seated_round("1", "practice");
        records.extend(seated_round("1", "1"));
        records.push(event("1", "1", 1, "Alice", 0, EventCode::BonusError));
        let seg = segment(records);

        assert_eq!(seg.rounds.len(), 1);
        assert_eq!(seg.rounds[0].round, "1");
    }

    #[test]
    fn test_practice_names_do_not_claim_quizzers() {
        let records = vec![
            team_name("1", "practice", 0, "Scratch"),
            quizzer_name("1", "practice", 0, 0, "Alice"),
            team_name("1", "1", 0, "Eagles"),
            quizzer_name("1", "1", 0, 0, "Alice"),
            event("1", "1", 1, "Alice", 0, EventCode::Correct),
        ];
        let seg = segment(records);
        assert_eq!(seg.directory.team_of("Alice"), Some("Eagles"));
        assert_eq!(seg.teams, vec!["Eagles"]);
    }

    #[test]
    fn test_first_team_affiliation_wins() {
        let mut records = seated_round("1", "1");
        records.push(event("1", "1", 1, "Alice", 0, EventCode::Correct));
        records.push(team_name("2", "1", 0, "Owls"));
        records.push(quizzer_name("2", "1", 0, 0, "Alice"));
        records.push(event("2", "1", 1, "Alice", 0, EventCode::Correct));
        let seg = segment(records);

        assert_eq!(seg.rounds.len(), 2);
        assert_eq!(seg.directory.team_of("Alice"), Some("Eagles"));
        assert_eq!(seg.directory.position("Alice"), Some(0));
        assert_eq!(seg.directory.len(), 3);
    }

    #[test]
    fn test_room_change_is_a_boundary() {
        let mut records = seated_round("1", "1");
        records.push(event("1", "1", 1, "Alice", 0, EventCode::Correct));
        records.extend(seated_round("2", "1"));
        let seg = segment(records);

        // Room 2 never saw action, so only room 1 is confirmed.
        assert_eq!(seg.rounds.len(), 1);
        assert_eq!(seg.rounds[0].room, "1");
    }

    #[test]
    fn test_empty_names_are_stripped() {
        let records = vec![
            team_name("1", "1", 1, "Eagles"),
            quizzer_name("1", "1", 1, 2, "Alice"),
            event("1", "1", 1, "Alice", 1, EventCode::Correct),
        ];
        let seg = segment(records);
        let round = &seg.rounds[0];
        assert_eq!(round.teams.len(), 1);
        assert_eq!(round.teams[0].number, 1);
        assert_eq!(round.teams[0].quizzers, vec!["Alice"]);
        assert_eq!(seg.directory.len(), 1);
    }

    #[test]
    fn test_duplicate_round_overwrites_with_warning() {
        let mut records = seated_round("1", "1");
        records.push(event("1", "1", 1, "Alice", 0, EventCode::Correct));
        records.push(team_name("1", "2", 0, "Eagles"));
        records.push(event("1", "2", 1, "Alice", 0, EventCode::Correct));
        records.extend(seated_round("1", "1"));
        records.push(event("1", "1", 1, "Bob", 0, EventCode::Error));
        let seg = segment(records);

        assert_eq!(seg.rounds.len(), 2);
        assert_eq!(seg.rounds[0].key, "Rm1Rd1");
        assert_eq!(seg.rounds[0].events[0].name, "Bob");
        assert!(seg.diagnostics.contains("Duplicate round number: Rm1Rd1"));
    }

    #[test]
    fn test_final_round_is_evaluated_at_stream_end() {
        let mut records = seated_round("4", "9");
        records.push(event("4", "9", 1, "Carol", 1, EventCode::Correct));
        let seg = segment(records);
        assert_eq!(seg.rounds.len(), 1);
        assert_eq!(seg.rounds[0].key, "Rm4Rd9");
    }

    #[test]
    fn test_renamed_slot_does_not_register_old_seats() {
        let records = vec![
            team_name("1", "1", 0, "Eagles"),
            quizzer_name("1", "1", 0, 0, "Alice"),
            quizzer_name("1", "1", 0, 1, "Stale"),
            team_name("1", "1", 0, "Eagles"),
            quizzer_name("1", "1", 0, 0, "Alice"),
            event("1", "1", 1, "Alice", 0, EventCode::Correct),
        ];
        let seg = segment(records);
        assert_eq!(seg.rounds[0].teams[0].quizzers, vec!["Alice"]);
        assert_eq!(seg.directory.team_of("Stale"), None);
        assert_eq!(seg.directory.len(), 1);
    }

    #[test]
    fn test_empty_stream() {
        let seg = segment(Vec::new());
        assert!(seg.rounds.is_empty());
        assert!(seg.directory.is_empty());
        assert!(seg.diagnostics.is_empty());
    }
}
