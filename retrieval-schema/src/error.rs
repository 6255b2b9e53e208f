//! Error types for the `retrieval-schema` crate.

use std::fmt;

use thiserror::Error;

/// A single field that failed a structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path to the offending field, e.g. `results[1].score`.
    pub path: String,
    /// What is wrong with the field.
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors raised while constructing or checking model values.
///
/// Validation is deterministic, so none of these are retryable. They are
/// meant to surface to whichever layer handed in the data.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input did not match the declared shape: a required field was
    /// missing, a value had the wrong type, or an enum received a value
    /// outside its closed set.
    #[error("malformed {type_name}: {source}")]
    Malformed {
        /// Short name of the type being deserialized.
        type_name: &'static str,
        /// The underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A string could not be parsed as a [`Source`](crate::Source).
    #[error("unknown source '{0}', expected one of: email, file, chat")]
    UnknownSource(String),

    /// The value deserialized but failed one or more structural checks.
    #[error("invalid {type_name}: {}", join_violations(.violations))]
    Invalid {
        /// Short name of the type being checked.
        type_name: &'static str,
        /// Every field that failed, in traversal order.
        violations: Vec<FieldViolation>,
    },

    /// A [`SchemaConfig`](crate::SchemaConfig) was rejected by its builder.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ValidationError {
    /// The individual field failures, if this is an [`Invalid`](Self::Invalid) error.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Invalid { violations, .. } => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A convenience result type for schema operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
