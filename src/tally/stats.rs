use serde::Serialize;

use super::question::QuestionType;

/// Counters for one quizzer and one question type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub attempted: u32,
    pub correct: u32,
    pub bonus_attempted: u32,
    pub bonus_correct: u32,
}

/// Per-quizzer, per-question-type counters.
///
/// Dimensions are fixed at creation: one row per directory quizzer, one
/// column per `QuestionType`. Memory-verse answers are counted in their own
/// column and again in the `M` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsMatrix {
    rows: Vec<[TypeCounts; QuestionType::COUNT]>,
}

impl StatsMatrix {
    pub fn new(quizzers: usize) -> Self {
        Self {
            rows: vec![[TypeCounts::default(); QuestionType::COUNT]; quizzers],
        }
    }

    pub fn quizzer_count(&self) -> usize {
        self.rows.len()
    }

    /// Record a toss-up answer. Out-of-range quizzer indices are ignored.
    pub fn record_answer(&mut self, quizzer: usize, qtype: QuestionType, correct: bool) {
        self.update(quizzer, qtype, |c| {
            c.attempted += 1;
            if correct {
                c.correct += 1;
            }
        });
    }

    /// Record a bonus answer. Out-of-range quizzer indices are ignored.
    pub fn record_bonus(&mut self, quizzer: usize, qtype: QuestionType, correct: bool) {
        self.update(quizzer, qtype, |c| {
            c.bonus_attempted += 1;
            if correct {
                c.bonus_correct += 1;
            }
        });
    }

    fn update<F>(&mut self, quizzer: usize, qtype: QuestionType, apply: F)
    where
        F: Fn(&mut TypeCounts),
    {
        let Some(row) = self.rows.get_mut(quizzer) else {
            return;
        };
        apply(&mut row[qtype.index()]);
        if qtype.is_memory_verse() {
            apply(&mut row[QuestionType::M.index()]);
        }
    }

    pub fn get(&self, quizzer: usize, qtype: QuestionType) -> TypeCounts {
        self.rows
            .get(quizzer)
            .map(|row| row[qtype.index()])
            .unwrap_or_default()
    }

    pub fn row(&self, quizzer: usize) -> Option<&[TypeCounts; QuestionType::COUNT]> {
        self.rows.get(quizzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_fixed() {
        let stats = StatsMatrix::new(3);
        assert_eq!(stats.quizzer_count(), 3);
        assert_eq!(stats.row(2).unwrap().len(), 9);
        assert!(stats.row(3).is_none());
    }

    #[test]
    fn test_correct_answer_bumps_attempt_and_correct() {
        let mut stats = StatsMatrix::new(1);
        stats.record_answer(0, QuestionType::G, true);
        let g = stats.get(0, QuestionType::G);
        assert_eq!(g.attempted, 1);
        assert_eq!(g.correct, 1);
        assert_eq!(g.bonus_attempted, 0);
        assert_eq!(stats.get(0, QuestionType::M), TypeCounts::default());
    }

    #[test]
    fn test_error_bumps_attempt_only() {
        let mut stats = StatsMatrix::new(1);
        stats.record_answer(0, QuestionType::A, false);
        let a = stats.get(0, QuestionType::A);
        assert_eq!(a.attempted, 1);
        assert_eq!(a.correct, 0);
    }

    #[test]
    fn test_memory_verse_mirrors_into_m() {
        let mut stats = StatsMatrix::new(1);
        stats.record_answer(0, QuestionType::Q, true);
        stats.record_answer(0, QuestionType::R, false);
        stats.record_bonus(0, QuestionType::V, true);

        let m = stats.get(0, QuestionType::M);
        assert_eq!(m.attempted, 2);
        assert_eq!(m.correct, 1);
        assert_eq!(m.bonus_attempted, 1);
        assert_eq!(m.bonus_correct, 1);
        assert_eq!(stats.get(0, QuestionType::Q).correct, 1);
        assert_eq!(stats.get(0, QuestionType::V).bonus_correct, 1);
    }

    #[test]
    fn test_bonus_only_touches_bonus_counters() {
        let mut stats = StatsMatrix::new(1);
        stats.record_bonus(0, QuestionType::S, false);
        let s = stats.get(0, QuestionType::S);
        assert_eq!(s.bonus_attempted, 1);
        assert_eq!(s.bonus_correct, 0);
        assert_eq!(s.attempted, 0);
    }

    #[test]
    fn test_out_of_range_quizzer_ignored() {
        let mut stats = StatsMatrix::new(1);
        stats.record_answer(5, QuestionType::G, true);
        assert_eq!(stats.get(5, QuestionType::G), TypeCounts::default());
        assert_eq!(stats.get(0, QuestionType::G), TypeCounts::default());
    }
}
