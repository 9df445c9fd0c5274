//! Structured, field-scoped validation errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable validation error codes
pub mod codes {
    pub const INVALID_SCHEMA: &str = "invalid_schema";
    pub const INVALID_SCHEMA_TYPE: &str = "invalid_schema_type";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const MISSING_REQUIRED: &str = "missing_required";
    pub const EMPTY_REQUIRED: &str = "empty_required";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const INVALID_FORMAT: &str = "invalid_format";
    pub const MIN_LENGTH: &str = "min_length";
    pub const MAX_LENGTH: &str = "max_length";
    pub const PATTERN_MISMATCH: &str = "pattern_mismatch";
    pub const INVALID_PATTERN: &str = "invalid_pattern";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const ENUM_MISMATCH: &str = "enum_mismatch";
    pub const UNEXPECTED_PROPERTY: &str = "unexpected_property";
}

const DEFAULT_SUGGESTION: &str = "Check the input against the capability's input schema";

/// A single validation failure
///
/// `field` is a dot-notation path (`billing.street`, `lines[2].amount`) and is empty
/// for errors about the input as a whole.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{}", self.render())]
pub struct ValidationError {
    /// Dot-notation path of the offending field
    pub field: String,
    /// Human-readable explanation
    pub message: String,
    /// Machine-readable code, see [`codes`]
    pub code: String,
    /// Actionable corrections, never empty
    pub suggestions: Vec<String>,
}

impl ValidationError {
    /// Create an error with no suggestions beyond the default hint
    pub fn new<F, M, C>(field: F, message: M, code: C) -> Self
    where
        F: Into<String>,
        M: Into<String>,
        C: Into<String>,
    {
        build_validation_error(field, message, code, Vec::new())
    }

    /// Add a suggestion
    pub fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        let suggestion = suggestion.into();
        if self.suggestions.len() == 1 && self.suggestions[0] == DEFAULT_SUGGESTION {
            self.suggestions.clear();
        }
        self.suggestions.push(suggestion);
        self
    }

    /// Whether the error concerns the input as a whole
    pub fn is_root(&self) -> bool {
        self.field.is_empty()
    }

    fn render(&self) -> String {
        if self.field.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.field, self.message)
        }
    }
}

/// Build a validation error, guaranteeing at least one suggestion
pub fn build_validation_error<F, M, C>(
    field: F,
    message: M,
    code: C,
    suggestions: Vec<String>,
) -> ValidationError
where
    F: Into<String>,
    M: Into<String>,
    C: Into<String>,
{
    let mut suggestions: Vec<String> = suggestions
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if suggestions.is_empty() {
        suggestions.push(DEFAULT_SUGGESTION.to_string());
    }
    ValidationError {
        field: field.into(),
        message: message.into(),
        code: code.into(),
        suggestions,
    }
}
