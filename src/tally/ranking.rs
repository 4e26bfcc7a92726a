use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::accumulate::RoundRecord;

/// A team's final standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRanking {
    pub name: String,
    /// 1-based
    pub placement: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_score: i32,
}

/// Accumulated head-to-head scores per unordered team pair.
///
/// The key is the two names in sorted order; slot 0 of the value always holds
/// the alphabetically smaller team's points.
#[derive(Debug, Default)]
struct HeadToHead {
    pairs: HashMap<(String, String), (i32, i32)>,
}

impl HeadToHead {
    fn record(&mut self, team_a: &str, score_a: i32, team_b: &str, score_b: i32) {
        let (key, swapped) = pair_key(team_a, team_b);
        let entry = self.pairs.entry(key).or_insert((0, 0));
        if swapped {
            entry.0 += score_b;
            entry.1 += score_a;
        } else {
            entry.0 += score_a;
            entry.1 += score_b;
        }
    }

    /// Points `team` has accumulated against `other`
    fn points(&self, team: &str, other: &str) -> i32 {
        let (key, swapped) = pair_key(team, other);
        match self.pairs.get(&key) {
            Some(&(first, second)) => {
                if swapped {
                    second
                } else {
                    first
                }
            }
            None => 0,
        }
    }
}

/// Sorted pair key; the flag is true when `a` is the larger name
fn pair_key(a: &str, b: &str) -> ((String, String), bool) {
    if a <= b {
        ((a.to_string(), b.to_string()), false)
    } else {
        ((b.to_string(), a.to_string()), true)
    }
}

/// Rank every named team across all rounds.
///
/// Teams are ordered by fewest losses, then most wins, then by head-to-head
/// points against each other. Teams still tied keep the order in which they
/// first appeared.
pub fn rank_teams(rounds: &[RoundRecord]) -> Vec<TeamRanking> {
    let mut standings: Vec<TeamRanking> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut head_to_head = HeadToHead::default();

    for round in rounds {
        let scored: Vec<(&str, i32)> = round.named_scores().collect();

        for &(name, score) in &scored {
            let i = *positions.entry(name.to_string()).or_insert_with(|| {
                standings.push(TeamRanking {
                    name: name.to_string(),
                    placement: 0,
                    wins: 0,
                    losses: 0,
                    total_score: 0,
                });
                standings.len() - 1
            });
            standings[i].total_score += score;
        }

        if scored.len() < 2 {
            continue;
        }

        // Each team beats every other team it outscored; ties count for neither.
        for &(name, score) in &scored {
            let opponents = || scored.iter().filter(|&&(other_name, _)| other_name != name);
            let wins = opponents().filter(|&&(_, other)| score > other).count() as u32;
            let losses = opponents().filter(|&&(_, other)| score < other).count() as u32;
            let standing = &mut standings[positions[name]];
            standing.wins += wins;
            standing.losses += losses;
        }

        // Two- and three-team rounds are direct matchups between every pair.
        if scored.len() <= 3 {
            for i in 0..scored.len() {
                for j in i + 1..scored.len() {
                    let (a, score_a) = scored[i];
                    let (b, score_b) = scored[j];
                    if a != b {
                        head_to_head.record(a, score_a, b, score_b);
                    }
                }
            }
        }
    }

    stable_sort_by(&mut standings, |a, b| compare_teams(a, b, &head_to_head));

    for (i, standing) in standings.iter_mut().enumerate() {
        standing.placement = (i + 1) as u32;
    }
    standings
}

fn compare_teams(a: &TeamRanking, b: &TeamRanking, head_to_head: &HeadToHead) -> Ordering {
    a.losses
        .cmp(&b.losses)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| {
            let a_points = head_to_head.points(&a.name, &b.name);
            let b_points = head_to_head.points(&b.name, &a.name);
            b_points.cmp(&a_points)
        })
}

/// Stable insertion sort.
///
/// Head-to-head results need not be transitive across three or more teams,
/// which `slice::sort_by` is allowed to reject at runtime.
fn stable_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
