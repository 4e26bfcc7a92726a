use serde::Serialize;

/// Marker character QuizMachine wraps around most logged fields.
pub const QUOTE_MARKER: char = '\'';

/// Column positions within one comma-delimited log line.
const COL_TOURNAMENT: usize = 1;
const COL_ROOM: usize = 3;
const COL_ROUND: usize = 4;
const COL_QUESTION: usize = 5;
const COL_NAME: usize = 7;
const COL_TEAM: usize = 8;
const COL_SEAT: usize = 9;
const COL_CODE: usize = 10;

/// Event type code from the 11th column of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventCode {
    /// `TC`: quizzer answered a toss-up question correctly
    Correct,
    /// `TE`: quizzer answered a toss-up question incorrectly
    Error,
    /// `BC`: bonus question answered correctly
    BonusCorrect,
    /// `BE`: bonus question answered incorrectly
    BonusError,
    /// `TN`: team name for a team slot
    TeamName,
    /// `QN`: quizzer name for a seat
    QuizzerName,
    /// `RM`: room marker
    RoomMarker,
    /// Any code the tabulator does not use
    Other,
}

impl EventCode {
    /// Parse an event code, tolerating the quote marker around it
    pub fn parse(code: &str) -> Self {
        match strip_quotes(code) {
            "TC" => EventCode::Correct,
            "TE" => EventCode::Error,
            "BC" => EventCode::BonusCorrect,
            "BE" => EventCode::BonusError,
            "TN" => EventCode::TeamName,
            "QN" => EventCode::QuizzerName,
            "RM" => EventCode::RoomMarker,
            _ => EventCode::Other,
        }
    }

    /// The two-letter code as written in the log
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCode::Correct => "TC",
            EventCode::Error => "TE",
            EventCode::BonusCorrect => "BC",
            EventCode::BonusError => "BE",
            EventCode::TeamName => "TN",
            EventCode::QuizzerName => "QN",
            EventCode::RoomMarker => "RM",
            EventCode::Other => "??",
        }
    }

    /// Codes that survive filtering and take part in tabulation
    pub fn is_tabulated(&self) -> bool {
        !matches!(self, EventCode::Other)
    }

    /// Scoring actions confirm that a round was actually quizzed
    pub fn is_scoring(&self) -> bool {
        matches!(
            self,
            EventCode::Correct | EventCode::Error | EventCode::BonusCorrect | EventCode::BonusError
        )
    }
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub tournament: String,
    pub room: String,
    pub round: String,
    /// 1-based question number, `None` when the column is blank or garbled
    pub question: Option<u32>,
    /// Quizzer name, or the team name for `TN` events
    pub name: String,
    pub team_number: usize,
    pub seat: usize,
    pub code: EventCode,
}

impl EventRecord {
    /// Build a record from the raw columns of one line.
    ///
    /// Missing columns read as empty and unparseable numbers fall back to 0, so
    /// any tokenizable line yields a record.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let columns: Vec<&str> = fields.into_iter().collect();
        let column = |i: usize| strip_quotes(columns.get(i).copied().unwrap_or(""));

        EventRecord {
            tournament: column(COL_TOURNAMENT).to_string(),
            room: column(COL_ROOM).to_string(),
            round: column(COL_ROUND).to_string(),
            question: column(COL_QUESTION).trim().parse().ok(),
            name: column(COL_NAME).to_string(),
            team_number: column(COL_TEAM).trim().parse().unwrap_or(0),
            seat: column(COL_SEAT).trim().parse().unwrap_or(0),
            code: EventCode::parse(columns.get(COL_CODE).copied().unwrap_or("")),
        }
    }

    /// Composite key identifying the round this record belongs to
    pub fn round_key(&self) -> String {
        round_key(&self.room, &self.round)
    }

    /// Questions 16 and later are overtime/special questions
    pub fn is_overtime(&self) -> bool {
        self.question.is_some_and(|q| q >= 16)
    }
}

/// Build the `Rm<room>Rd<round>` key used to index confirmed rounds
pub fn round_key(room: &str, round: &str) -> String {
    format!("Rm{}Rd{}", room, round)
}

/// Remove leading and trailing quote markers from a field
pub fn strip_quotes(field: &str) -> &str {
    field.trim_matches(QUOTE_MARKER)
}
