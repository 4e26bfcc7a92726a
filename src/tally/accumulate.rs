use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::question::{QuestionType, QuestionTypeMap, TypeLookup};
use super::segment::{QuizzerDirectory, RoundGroup};
use super::stats::StatsMatrix;
use crate::diagnostics::Diagnostics;
use crate::records::{EventCode, EventRecord};

/// Points for a correct toss-up answer
pub const CORRECT_POINTS: i32 = 20;
/// Points for a correct bonus answer
pub const BONUS_POINTS: i32 = 10;
/// Quiz-out bonus: fourth correct answer with no errors
pub const QUIZ_OUT_BONUS: i32 = 10;
/// Third/fourth person bonus: a new teammate's first correct answer
pub const TEAMMATE_BONUS: i32 = 10;
/// Deduction for a third error, or any error on an overtime question
pub const ERROR_PENALTY: i32 = 10;

const QUIZ_OUT_CORRECT: u32 = 4;
const ERROR_OUT_INCORRECT: u32 = 3;
const TEAMMATE_BONUS_THRESHOLD: usize = 3;

/// Final team scores for one confirmed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    pub room: String,
    pub round: String,
    pub team_names: Vec<String>,
    /// Parallel to `team_names`
    pub team_scores: Vec<i32>,
}

impl RoundRecord {
    /// (name, score) pairs for teams with a name
    pub fn named_scores(&self) -> impl Iterator<Item = (&str, i32)> {
        self.team_names
            .iter()
            .zip(&self.team_scores)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, score)| (name.as_str(), *score))
    }
}

/// Result of running every confirmed round through the scoring rules.
#[derive(Debug, Clone)]
pub struct Accumulation {
    pub stats: StatsMatrix,
    pub rounds: Vec<RoundRecord>,
    pub diagnostics: Diagnostics,
}

/// A quizzer who has answered in the current round
#[derive(Debug)]
struct ActiveQuizzer {
    name: String,
    correct: u32,
    incorrect: u32,
}

#[derive(Debug)]
struct TeamTally {
    name: String,
    score: i32,
    active: Vec<ActiveQuizzer>,
}

impl TeamTally {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
            active: Vec::new(),
        }
    }

    fn find_active(&self, quizzer: &str) -> Option<usize> {
        self.active.iter().position(|q| q.name == quizzer)
    }

    /// Index of the quizzer's entry, adding an empty one if needed
    fn active_entry(&mut self, quizzer: &str) -> usize {
        match self.find_active(quizzer) {
            Some(i) => i,
            None => {
                self.active.push(ActiveQuizzer {
                    name: quizzer.to_string(),
                    correct: 0,
                    incorrect: 0,
                });
                self.active.len() - 1
            }
        }
    }

    fn scoring_quizzers(&self) -> usize {
        self.active.iter().filter(|q| q.correct > 0).count()
    }
}

/// Scratch state for the round being scored. Teams are keyed by their slot
/// number so gaps left by unnamed teams never shift anyone's position.
struct RoundTally<'a> {
    room: &'a str,
    round: &'a str,
    teams: BTreeMap<usize, TeamTally>,
}

impl<'a> RoundTally<'a> {
    fn new(group: &'a RoundGroup) -> Self {
        let teams = group
            .teams
            .iter()
            .map(|t| (t.number, TeamTally::new(&t.name)))
            .collect();
        Self {
            room: &group.room,
            round: &group.round,
            teams,
        }
    }

    /// Get the team at `number`, creating it with a warning if the roster
    /// never named it. Well-formed logs never take the creation path.
    ///
    /// A created team takes `name` unless another slot in this round already
    /// has it; then it stays unnamed so no team ever plays itself.
    fn ensure_team(&mut self, number: usize, name: &str, diag: &mut Diagnostics) -> &mut TeamTally {
        if !self.teams.contains_key(&number) {
            diag.warn(format!(
                "Warning: Team number {} added mid-round in room {} round {}. This should not happen.",
                number, self.room, self.round
            ));
        }
        let taken = self.teams.values().any(|t| t.name == name);
        self.teams
            .entry(number)
            .or_insert_with(|| TeamTally::new(if taken { "" } else { name }))
    }

    fn is_active_anywhere(&self, quizzer: &str) -> bool {
        self.teams.values().any(|t| t.find_active(quizzer).is_some())
    }

    fn into_record(self) -> RoundRecord {
        let (team_names, team_scores): (Vec<String>, Vec<i32>) = self.teams.into_values().map(|t| (t.name, t.score)).unzip();
        RoundRecord {
            room: self.room.to_string(),
            round: self.round.to_string(),
            team_names,
            team_scores,
        }
    }
}

/// Run every confirmed round through the scoring rules, filling in individual
/// statistics and each round's team scores.
pub fn accumulate(groups: &[RoundGroup], directory: &QuizzerDirectory, types: &QuestionTypeMap) -> Accumulation {
    let mut stats = StatsMatrix::new(directory.len());
    let mut rounds = Vec::with_capacity(groups.len());
    let mut diag = Diagnostics::new();
    let mut missing: Vec<String> = Vec::new();
    let mut unknown: HashSet<String> = HashSet::new();

    for group in groups {
        debug!(round = %group.key, "Scoring round");
        let mut tally = RoundTally::new(group);

        for record in &group.events {
            let qtype = match types.lookup(&group.round, record.question) {
                TypeLookup::Found(t) => t,
                TypeLookup::MissingRound => {
                    if !missing.contains(&group.round) {
                        diag.warn(format!(
                            "Warning: Missing question set for round {}! Its questions are treated as general.",
                            group.round
                        ));
                        missing.push(group.round.clone());
                    }
                    QuestionType::G
                }
            };

            let quizzer = directory.position(&record.name);
            if quizzer.is_none() && record.code.is_scoring() && unknown.insert(record.name.clone()) {
                diag.warn(format!(
                    "Warning: Quizzer '{}' in room {} round {} was never seated on a team. \
                     Their answers count toward team scores but not individual statistics.",
                    record.name, group.room, group.round
                ));
            }

            if let Some(q) = quizzer {
                record_individual(&mut stats, q, qtype, record.code);
            }
            score_event(&mut tally, record, directory, &mut diag);
        }

        let record = tally.into_record();
        debug!(
            round = %group.key,
            teams = ?record.team_names,
            scores = ?record.team_scores,
            "Round scored"
        );
        rounds.push(record);
    }

    if !missing.is_empty() {
        diag.warn(format!(
            "Warning: Some rounds are missing question sets! These questions will be treated as general! \
             Skipped rounds: {:?}. Question sets found: {:?}. Round names must match between the quiz log and the question set files!",
            missing,
            types.sorted_rounds()
        ));
    }

    Accumulation {
        stats,
        rounds,
        diagnostics: diag,
    }
}

fn record_individual(stats: &mut StatsMatrix, quizzer: usize, qtype: QuestionType, code: EventCode) {
    match code {
        EventCode::Correct => stats.record_answer(quizzer, qtype, true),
        EventCode::Error => stats.record_answer(quizzer, qtype, false),
        EventCode::BonusCorrect => stats.record_bonus(quizzer, qtype, true),
        EventCode::BonusError => stats.record_bonus(quizzer, qtype, false),
        _ => {}
    }
}

/// Apply one event's effect on team scores
fn score_event(tally: &mut RoundTally<'_>, record: &EventRecord, directory: &QuizzerDirectory, diag: &mut Diagnostics) {
    let quizzer = record.name.as_str();
    let question = record.question.unwrap_or(0);
    // A team created on the fly takes the quizzer's home team name when known.
    let fallback_name = directory.team_of(quizzer).unwrap_or("");

    match record.code {
        EventCode::Correct => {
            let team = tally.ensure_team(record.team_number, fallback_name, diag);
            team.score += CORRECT_POINTS;
            debug!(question, quizzer, team = %team.name, "[Team Scoring] correct answer, +{}", CORRECT_POINTS);

            let i = team.active_entry(quizzer);
            team.active[i].correct += 1;
            let entry = &team.active[i];
            let quiz_out = entry.correct == QUIZ_OUT_CORRECT && entry.incorrect == 0;
            let first_correct = entry.correct == 1;

            if quiz_out {
                team.score += QUIZ_OUT_BONUS;
                debug!(quizzer, team = %team.name, "[Team Scoring] quiz-out bonus, +{}", QUIZ_OUT_BONUS);
            }
            if first_correct && team.scoring_quizzers() >= TEAMMATE_BONUS_THRESHOLD {
                team.score += TEAMMATE_BONUS;
                debug!(quizzer, team = %team.name, "[Team Scoring] 3rd/4th person bonus, +{}", TEAMMATE_BONUS);
            }
        }
        EventCode::Error => {
            let team = tally.ensure_team(record.team_number, fallback_name, diag);
            let penalized = match team.find_active(quizzer) {
                Some(i) => {
                    team.active[i].incorrect += 1;
                    team.active[i].incorrect == ERROR_OUT_INCORRECT || record.is_overtime()
                }
                None => {
                    team.active.push(ActiveQuizzer {
                        name: quizzer.to_string(),
                        correct: 0,
                        incorrect: 1,
                    });
                    record.is_overtime()
                }
            };
            if penalized {
                team.score -= ERROR_PENALTY;
                debug!(question, quizzer, team = %team.name, "[Team Scoring] error deduction, -{}", ERROR_PENALTY);
            } else {
                debug!(question, quizzer, "[Team Scoring] error, no penalty");
            }
        }
        EventCode::BonusCorrect => {
            let already_active = tally.is_active_anywhere(quizzer);
            let team = tally.ensure_team(record.team_number, fallback_name, diag);
            team.score += BONUS_POINTS;
            debug!(question, quizzer, team = %team.name, "[Team Scoring] bonus, +{}", BONUS_POINTS);
            if !already_active {
                team.active_entry(quizzer);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::types::fixtures::{event, quizzer_name, team_name};
    use crate::tally::segment::segment;

    /// Two seated teams in room 1 round 1, followed by `events`
    fn two_team_round(events: Vec<EventRecord>) -> Vec<EventRecord> {
        let mut records = vec![
            team_name("1", "1", 0, "Eagles"),
            quizzer_name("1", "1", 0, 0, "Alice"),
            quizzer_name("1", "1", 0, 1, "Amos"),
            quizzer_name("1", "1", 0, 2, "Anna"),
            quizzer_name("1", "1", 0, 3, "Abel"),
            quizzer_name("1", "1", 0, 4, "Ada"),
            team_name("1", "1", 1, "Hawks"),
            quizzer_name("1", "1", 1, 0, "Bob"),
        ];
        records.extend(events);
        records
    }

    fn tc(q: u32, name: &str, team: usize) -> EventRecord {
        event("1", "1", q, name, team, EventCode::Correct)
    }

    fn te(q: u32, name: &str, team: usize) -> EventRecord {
        event("1", "1", q, name, team, EventCode::Error)
    }

    fn general_types() -> QuestionTypeMap {
        let mut types = QuestionTypeMap::new();
        types.insert("1", vec!['G'; 20]);
        types
    }

    fn run(records: Vec<EventRecord>, types: &QuestionTypeMap) -> (Accumulation, QuizzerDirectory) {
        let seg = segment(records);
        let acc = accumulate(&seg.rounds, &seg.directory, types);
        (acc, seg.directory)
    }

    fn scores(events: Vec<EventRecord>) -> Vec<i32> {
        let (acc, _) = run(two_team_round(events), &general_types());
        acc.rounds[0].team_scores.clone()
    }

    #[test]
    fn test_correct_and_overtime_error() {
        let (acc, _) = run(two_team_round(vec![tc(1, "Alice", 0), te(16, "Bob", 1)]), &general_types());
        let round = &acc.rounds[0];
        assert_eq!(round.team_names, vec!["Eagles", "Hawks"]);
        assert_eq!(round.team_scores, vec![20, -10]);
    }

    #[test]
    fn test_quiz_out_bonus() {
        let events = (1..=4).map(|q| tc(q, "Alice", 0)).collect();
        assert_eq!(scores(events), vec![90, 0]);
    }

    #[test]
    fn test_quiz_out_fires_once() {
        let events = (1..=6).map(|q| tc(q, "Alice", 0)).collect();
        assert_eq!(scores(events), vec![130, 0]);
    }

    #[test]
    fn test_no_quiz_out_after_error() {
        let mut events = vec![te(1, "Alice", 0)];
        events.extend((2..=5).map(|q| tc(q, "Alice", 0)));
        assert_eq!(scores(events), vec![80, 0]);
    }

    #[test]
    fn test_third_and_fourth_person_bonus() {
        let events = vec![
            tc(1, "Alice", 0),
            tc(2, "Amos", 0),
            tc(3, "Anna", 0),
            tc(4, "Abel", 0),
        ];
        // 4 x 20, plus 10 each for the third and fourth scorers
        assert_eq!(scores(events), vec![100, 0]);
    }

    #[test]
    fn test_teammate_bonus_only_on_first_correct() {
        let events = vec![
            tc(1, "Alice", 0),
            tc(2, "Amos", 0),
            tc(3, "Anna", 0),
            tc(4, "Anna", 0),
        ];
        assert_eq!(scores(events), vec![90, 0]);
    }

    #[test]
    fn test_erring_teammate_does_not_count_toward_bonus() {
        let events = vec![tc(1, "Alice", 0), te(2, "Amos", 0), tc(3, "Anna", 0)];
        assert_eq!(scores(events), vec![40, 0]);
    }

    #[test]
    fn test_third_error_penalty() {
        let events = vec![te(1, "Bob", 1), te(2, "Bob", 1), te(3, "Bob", 1), te(4, "Bob", 1)];
        assert_eq!(scores(events), vec![0, -10]);
    }

    #[test]
    fn test_overtime_errors_always_penalized() {
        let events = vec![te(16, "Bob", 1), te(17, "Bob", 1), te(18, "Bob", 1)];
        assert_eq!(scores(events), vec![0, -30]);
    }

    #[test]
    fn test_errors_by_different_quizzers_do_not_stack() {
        let events = vec![te(1, "Alice", 0), te(2, "Amos", 0), te(3, "Anna", 0)];
        assert_eq!(scores(events), vec![0, 0]);
    }

    #[test]
    fn test_bonus_scoring() {
        let events = vec![
            event("1", "1", 1, "Bob", 1, EventCode::BonusCorrect),
            event("1", "1", 2, "Bob", 1, EventCode::BonusError),
        ];
        assert_eq!(scores(events), vec![0, 10]);
    }

    #[test]
    fn test_bonus_presence_entry_still_gets_teammate_bonus() {
        let events = vec![
            event("1", "1", 1, "Alice", 0, EventCode::BonusCorrect),
            tc(2, "Amos", 0),
            tc(3, "Anna", 0),
            tc(4, "Alice", 0),
        ];
        // Alice's bonus gave her a (0, 0) entry; her first toss-up is still
        // the third scorer, so the bonus applies.
        assert_eq!(scores(events), vec![80, 0]);
    }

    #[test]
    fn test_individual_stats_by_type() {
        let mut types = QuestionTypeMap::new();
        types.insert("1", vec!['A', 'Q', 'V', 'S']);
        let events = vec![
            tc(1, "Alice", 0),
            te(2, "Alice", 0),
            event("1", "1", 3, "Alice", 0, EventCode::BonusCorrect),
            event("1", "1", 4, "Alice", 0, EventCode::BonusError),
        ];
        let (acc, dir) = run(two_team_round(events), &types);
        let alice = dir.position("Alice").unwrap();

        let a = acc.stats.get(alice, QuestionType::A);
        assert_eq!((a.attempted, a.correct), (1, 1));
        let q = acc.stats.get(alice, QuestionType::Q);
        assert_eq!((q.attempted, q.correct), (1, 0));
        let v = acc.stats.get(alice, QuestionType::V);
        assert_eq!((v.bonus_attempted, v.bonus_correct), (1, 1));
        let s = acc.stats.get(alice, QuestionType::S);
        assert_eq!((s.bonus_attempted, s.bonus_correct), (1, 0));
        let m = acc.stats.get(alice, QuestionType::M);
        assert_eq!((m.attempted, m.correct, m.bonus_attempted, m.bonus_correct), (1, 0, 1, 1));
        assert!(acc.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_round_counts_as_general_with_warnings() {
        let events = vec![tc(1, "Alice", 0), tc(2, "Alice", 0)];
        let (acc, dir) = run(two_team_round(events), &QuestionTypeMap::new());
        let alice = dir.position("Alice").unwrap();

        assert_eq!(acc.stats.get(alice, QuestionType::G).correct, 2);
        assert_eq!(acc.stats.get(alice, QuestionType::A).attempted, 0);
        // One warning for the round, one summary
        assert_eq!(acc.diagnostics.len(), 2);
        assert!(acc.diagnostics.contains("Missing question set for round 1"));
        assert!(acc.diagnostics.contains("Some rounds are missing question sets"));
    }

    #[test]
    fn test_unknown_quizzer_scores_for_team_only() {
        let events = vec![tc(1, "Zed", 1), tc(2, "Zed", 1)];
        let (acc, dir) = run(two_team_round(events), &general_types());
        assert_eq!(acc.rounds[0].team_scores, vec![0, 40]);
        assert_eq!(acc.stats.quizzer_count(), dir.len());
        assert_eq!(acc.diagnostics.len(), 1);
        assert!(acc.diagnostics.contains("'Zed'"));
    }

    #[test]
    fn test_unnamed_team_created_mid_round() {
        let events = vec![tc(1, "Bob", 3)];
        let (acc, _) = run(two_team_round(events), &general_types());
        let round = &acc.rounds[0];
        // Hawks already holds slot 1, so the new slot stays unnamed
        assert_eq!(round.team_names, vec!["Eagles", "Hawks", ""]);
        assert_eq!(round.team_scores, vec![0, 0, 20]);
        assert!(acc.diagnostics.contains("Team number 3 added mid-round in room 1 round 1"));
    }

    #[test]
    fn test_mid_round_team_takes_absent_home_name() {
        let mut records = two_team_round(vec![tc(1, "Alice", 0)]);
        records.push(team_name("1", "2", 0, "Eagles"));
        records.push(quizzer_name("1", "2", 0, 0, "Alice"));
        records.push(event("1", "2", 1, "Bob", 1, EventCode::Correct));
        let (acc, _) = run(records, &general_types());
        let round = &acc.rounds[1];
        assert_eq!(round.team_names, vec!["Eagles", "Hawks"]);
        assert_eq!(round.team_scores, vec![0, 20]);
    }

    #[test]
    fn test_stats_rows_match_directory() {
        let (acc, dir) = run(two_team_round(vec![tc(1, "Alice", 0)]), &general_types());
        assert_eq!(acc.stats.quizzer_count(), dir.len());
        assert_eq!(dir.len(), 6);
    }

    #[test]
    fn test_named_scores_skip_unnamed() {
        let record = RoundRecord {
            room: "1".to_string(),
            round: "1".to_string(),
            team_names: vec!["Eagles".to_string(), String::new()],
            team_scores: vec![40, 20],
        };
        assert_eq!(record.named_scores().collect::<Vec<_>>(), vec![("Eagles", 40)]);
    }
}
