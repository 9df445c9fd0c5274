//! Error types and handling for the capability catalogue

use crate::context::CancellationReason;
use crate::validation::ValidationError;
use thiserror::Error;

/// Result type alias for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the capability catalogue
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A capability definition is malformed and was not stored
    #[error("Invalid definition for '{name}': {message}")]
    InvalidDefinition { name: String, message: String },

    /// A capability with the same name is already registered
    #[error("Capability '{name}' is already registered")]
    DuplicateName { name: String },

    /// No capability with the requested name exists
    #[error("Capability '{name}' not found{}", format_suggestions(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// Caller-supplied arguments failed schema validation
    #[error("Invalid input for '{tool}': {error}")]
    InvalidInput {
        tool: String,
        error: ValidationError,
    },

    /// A category name that is not part of the closed category set
    #[error("Unknown category '{category}' (known: {})", .known.join(", "))]
    UnknownCategory {
        category: String,
        known: Vec<String>,
    },

    /// Category metadata required by a consumer does not exist
    #[error("No metadata for category '{category}'")]
    MetadataMissing { category: String },

    /// A required collaborator was missing at construction time
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// Bootstrap integrity check failed
    #[error("Integrity check failed: {message}")]
    Integrity { message: String },

    /// The operation was cancelled before it started
    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: CancellationReason },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl CatalogError {
    /// Create an invalid definition error
    pub fn invalid_definition<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate_name<S: Into<String>>(name: S) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a not found error with suggested alternatives
    pub fn not_found<S: Into<String>>(name: S, suggestions: Vec<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            suggestions,
        }
    }

    /// Wrap a validation failure for a named capability
    pub fn invalid_input<S: Into<String>>(tool: S, error: ValidationError) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            error,
        }
    }

    /// Create an unknown category error listing the known categories
    pub fn unknown_category<S: Into<String>>(category: S) -> Self {
        Self::UnknownCategory {
            category: category.into(),
            known: crate::registry::Category::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }

    /// Create a missing metadata error
    pub fn metadata_missing<S: Into<String>>(category: S) -> Self {
        Self::MetadataMissing {
            category: category.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create an integrity error
    pub fn integrity<S: Into<String>>(message: S) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(reason: CancellationReason) -> Self {
        Self::Cancelled { reason }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is a cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CatalogError::Cancelled { .. })
    }

    /// Actionable hints carried by lookup and validation errors
    pub fn suggestions(&self) -> &[String] {
        match self {
            CatalogError::NotFound { suggestions, .. } => suggestions,
            CatalogError::InvalidInput { error, .. } => &error.suggestions,
            CatalogError::UnknownCategory { known, .. } => known,
            _ => &[],
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CatalogError::InvalidDefinition { .. } => "invalid_definition",
            CatalogError::DuplicateName { .. } => "duplicate_name",
            CatalogError::NotFound { .. } => "not_found",
            CatalogError::InvalidInput { .. } => "invalid_input",
            CatalogError::UnknownCategory { .. } => "unknown_category",
            CatalogError::MetadataMissing { .. } => "metadata_missing",
            CatalogError::Precondition { .. } => "precondition",
            CatalogError::Integrity { .. } => "integrity",
            CatalogError::Cancelled { .. } => "cancelled",
            CatalogError::Config { .. } => "config",
            CatalogError::Io(_) => "io",
            CatalogError::Serde(_) => "serialization",
            CatalogError::Yaml(_) => "yaml",
        }
    }
}
