use super::schema::Config;
use crate::tally::QuestionType;

/// Validate merged configuration before a run.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref delimiter) = config.delimiter {
        if delimiter.is_empty() {
            errors.push("delimiter: must not be empty".to_string());
        }
    }

    if let Some(ref types) = config.question_types {
        match QuestionType::parse_selection(types) {
            Ok(selected) if selected.is_empty() => {
                errors.push("question_types: select at least one question type".to_string());
            }
            Ok(_) => {}
            Err(c) => errors.push(format!(
                "question_types: invalid question type '{}' (expected one of {})",
                c,
                QuestionType::ALL.iter().map(|t| t.as_char()).collect::<String>()
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
