use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Question categories, in the fixed column order used by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum QuestionType {
    A,
    G,
    I,
    Q,
    R,
    S,
    X,
    V,
    /// Aggregate slot for memory-verse questions (Q, R and V)
    M,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::A,
        QuestionType::G,
        QuestionType::I,
        QuestionType::Q,
        QuestionType::R,
        QuestionType::S,
        QuestionType::X,
        QuestionType::V,
        QuestionType::M,
    ];

    /// Number of type slots in the statistics tables
    pub const COUNT: usize = Self::ALL.len();

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_char() == c.to_ascii_uppercase())
    }

    pub fn as_char(self) -> char {
        match self {
            QuestionType::A => 'A',
            QuestionType::G => 'G',
            QuestionType::I => 'I',
            QuestionType::Q => 'Q',
            QuestionType::R => 'R',
            QuestionType::S => 'S',
            QuestionType::X => 'X',
            QuestionType::V => 'V',
            QuestionType::M => 'M',
        }
    }

    /// Column slot in the statistics tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Q, R and V also count toward the `M` total
    pub fn is_memory_verse(self) -> bool {
        matches!(self, QuestionType::Q | QuestionType::R | QuestionType::V)
    }

    /// Parse a selection such as "AGQ" or "A,G,Q". Returns the offending
    /// character on failure.
    pub fn parse_selection(s: &str) -> Result<Vec<QuestionType>, char> {
        let mut types = Vec::new();
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let t = QuestionType::from_char(c).ok_or(c)?;
            if !types.contains(&t) {
                types.push(t);
            }
        }
        Ok(types)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Per-round question-type codes from the question-set files.
///
/// Index `n` of a round's list is the type of question `n + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionTypeMap {
    rounds: HashMap<String, Vec<char>>,
}

/// How a question's type was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLookup {
    Found(QuestionType),
    /// The round has no question set at all
    MissingRound,
}

impl QuestionTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a round's codes. The first set registered for a round wins; returns
    /// false if the round was already present.
    pub fn insert(&mut self, round: impl Into<String>, codes: Vec<char>) -> bool {
        let round = round.into();
        if self.rounds.contains_key(&round) {
            return false;
        }
        self.rounds.insert(round, codes);
        true
    }

    pub fn contains_round(&self, round: &str) -> bool {
        self.rounds.contains_key(round)
    }

    pub fn codes(&self, round: &str) -> Option<&[char]> {
        self.rounds.get(round).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Round ids in sorted order, for readable warnings
    pub fn sorted_rounds(&self) -> Vec<&str> {
        let mut rounds: Vec<&str> = self.rounds.keys().map(String::as_str).collect();
        rounds.sort_unstable();
        rounds
    }

    /// Resolve the type of a 1-based question in a round.
    ///
    /// Questions past the end of a known set, unnumbered questions and
    /// unrecognised codes are treated as general (`G`).
    pub fn lookup(&self, round: &str, question: Option<u32>) -> TypeLookup {
        let Some(codes) = self.rounds.get(round) else {
            return TypeLookup::MissingRound;
        };
        let code = question
            .and_then(|q| (q as usize).checked_sub(1))
            .and_then(|i| codes.get(i).copied());
        TypeLookup::Found(code.and_then(QuestionType::from_char).unwrap_or(QuestionType::G))
    }
}
