use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinmanError {
    #[error("{file}, line {line}: {message}")]
    Format {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Field name '{0}' has no expansions")]
    UnknownField(String),

    #[error("Field name '{field}' has multiple expansions: {}", candidates.join(", "))]
    AmbiguousField {
        field: String,
        candidates: Vec<String>,
    },

    #[error("Range '{token}' ignored: {reason}")]
    MalformedRange { token: String, reason: String },

    #[error("Invalid condition '{condition}': {reason}")]
    InvalidCondition { condition: String, reason: String },

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No position {0} in the current selection")]
    NoSuchPosition(usize),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinmanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_file_and_line() {
        let e = FinmanError::Format {
            file: "a.jsonl".to_string(),
            line: 7,
            message: "expected record 'SetSummary'".to_string(),
        };
        assert_eq!(e.to_string(), "a.jsonl, line 7: expected record 'SetSummary'");
    }

    #[test]
    fn test_ambiguous_field_lists_candidates() {
        let e = FinmanError::AmbiguousField {
            field: "cat".to_string(),
            candidates: vec!["category".to_string(), "category_auto".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "Field name 'cat' has multiple expansions: category, category_auto"
        );
    }
}
