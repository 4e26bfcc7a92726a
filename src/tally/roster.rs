use serde::Serialize;

use crate::records::{EventCode, EventRecord};

/// A team as seen in one round: its slot number, name and seated quizzers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterTeam {
    /// Positional key within the round only
    pub number: usize,
    pub name: String,
    /// Quizzer names in seat order
    pub quizzers: Vec<String>,
}

/// Scratch roster rebuilt from `TN`/`QN` events for a single round.
///
/// Slots grow on demand, filling gaps with unnamed placeholders. A later event
/// for the same slot overwrites the earlier one.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    teams: Vec<RosterTeam>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an identity event. Returns false for any other event code.
    pub fn apply(&mut self, record: &EventRecord) -> bool {
        match record.code {
            EventCode::TeamName => {
                self.set_team_name(record.team_number, &record.name);
                true
            }
            EventCode::QuizzerName => {
                self.set_quizzer(record.team_number, record.seat, &record.name);
                true
            }
            _ => false,
        }
    }

    /// Name a slot. This replaces the whole slot, so its seats start empty.
    pub fn set_team_name(&mut self, number: usize, name: &str) {
        let team = self.ensure_team(number);
        team.name = name.to_string();
        team.quizzers.clear();
    }

    pub fn set_quizzer(&mut self, number: usize, seat: usize, name: &str) {
        let team = self.ensure_team(number);
        if team.quizzers.len() <= seat {
            team.quizzers.resize(seat + 1, String::new());
        }
        team.quizzers[seat] = name.to_string();
    }

    /// Get the slot for `number`, creating placeholders up to it
    fn ensure_team(&mut self, number: usize) -> &mut RosterTeam {
        while self.teams.len() <= number {
            let next = self.teams.len();
            self.teams.push(RosterTeam {
                number: next,
                ..RosterTeam::default()
            });
        }
        &mut self.teams[number]
    }

    pub fn teams(&self) -> &[RosterTeam] {
        &self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Drop unnamed teams and empty seats, yielding the confirmed snapshot.
    /// Team numbers are preserved so scoring events still find their team.
    pub fn into_confirmed(self) -> Vec<RosterTeam> {
        self.teams
            .into_iter()
            .filter(|t| !t.name.is_empty())
            .map(|mut t| {
                t.quizzers.retain(|q| !q.is_empty());
                t
            })
            .collect()
    }
}
