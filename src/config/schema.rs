use serde::{Deserialize, Serialize};

use crate::tally::QuestionType;

/// Default field delimiter for text reports
pub const DEFAULT_DELIMITER: &str = ",";

/// Report encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Delimited text tables
    #[default]
    Csv,
    /// A single JSON document
    Json,
}

/// Defaults read from the YAML config file. Every field is optional; command
/// line flags take precedence.
///
/// Example YAML:
/// ```yaml
/// delimiter: ";"
/// tournament: Spring Invitational
/// question_types: AGQRM
/// display_rounds: true
/// format: csv
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Field delimiter for text output (default ",")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    /// Only tabulate log lines for this tournament name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<String>,

    /// Question-type columns to include, e.g. "AGIQRSXVM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_types: Option<String>,

    /// Include the per-round score breakdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_rounds: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Values from `overrides` replace ours wherever they are set
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            delimiter: overrides.delimiter.or(self.delimiter),
            tournament: overrides.tournament.or(self.tournament),
            question_types: overrides.question_types.or(self.question_types),
            display_rounds: overrides.display_rounds.or(self.display_rounds),
            format: overrides.format.or(self.format),
        }
    }

    /// A fully populated config, used when writing a starter file
    pub fn starter() -> Config {
        Config {
            delimiter: Some(DEFAULT_DELIMITER.to_string()),
            tournament: None,
            question_types: Some(QuestionType::ALL.iter().map(|t| t.as_char()).collect()),
            display_rounds: Some(false),
            format: Some(OutputFormat::Csv),
        }
    }

    /// Effective report settings. Assumes `validate_config` passed; an
    /// unparseable type selection falls back to all types.
    pub fn settings(&self) -> ReportSettings {
        let question_types = match &self.question_types {
            Some(s) => QuestionType::parse_selection(s).unwrap_or_default(),
            None => QuestionType::ALL.to_vec(),
        };
        ReportSettings {
            delimiter: self
                .delimiter
                .clone()
                .unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
            tournament: self.tournament.clone().filter(|t| !t.is_empty()),
            question_types,
            display_rounds: self.display_rounds.unwrap_or(false),
            format: self.format.unwrap_or_default(),
        }
    }
}

/// Fully resolved options for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub delimiter: String,
    pub tournament: Option<String>,
    /// Selected question types; empty means all of them
    pub question_types: Vec<QuestionType>,
    pub display_rounds: bool,
    pub format: OutputFormat,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Config::default().settings()
    }
}
