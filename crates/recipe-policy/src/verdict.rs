//! Validation result types
//!
//! Errors are data: validators accumulate them in emission order and never
//! fail early.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single structural or submission validation failure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    /// Recipe names a kind outside the whitelist
    UnsupportedComponentKind { kind: String },

    /// Input Recipe without fields
    EmptySchema,

    /// Schema field uses a type outside the whitelist
    InvalidFieldType {
        key: String,
        expected: String,
        actual: String,
    },

    /// Required field absent from the schema, or blank in a submission
    MissingRequiredField { key: String },

    /// Value fails a type, length or format check
    InvalidValue { key: String, reason: String },
}

impl ValidationError {
    pub fn unsupported_component_kind(kind: impl Into<String>) -> Self {
        ValidationError::UnsupportedComponentKind { kind: kind.into() }
    }

    pub fn invalid_field_type(
        key: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidFieldType {
            key: key.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_required_field(key: impl Into<String>) -> Self {
        ValidationError::MissingRequiredField { key: key.into() }
    }

    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedComponentKind { .. } => "unsupported_component_kind",
            ValidationError::EmptySchema => "empty_schema",
            ValidationError::InvalidFieldType { .. } => "invalid_field_type",
            ValidationError::MissingRequiredField { .. } => "missing_required_field",
            ValidationError::InvalidValue { .. } => "invalid_value",
        }
    }

    /// Field key the error refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidFieldType { key, .. }
            | ValidationError::MissingRequiredField { key }
            | ValidationError::InvalidValue { key, .. } => Some(key),
            ValidationError::UnsupportedComponentKind { .. } | ValidationError::EmptySchema => {
                None
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::UnsupportedComponentKind { kind } => {
                write!(f, "Unsupported component: {}", kind)
            }
            ValidationError::EmptySchema => write!(f, "Form has no fields"),
            ValidationError::InvalidFieldType { key, expected, actual } => {
                write!(f, "Invalid field type for '{}': expected {}, got '{}'", key, expected, actual)
            }
            ValidationError::MissingRequiredField { key } => {
                write!(f, "Missing required field: {}", key)
            }
            ValidationError::InvalidValue { key, reason } => write!(f, "{}: {}", key, reason),
        }
    }
}

/// Outcome of structural or submission validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    /// Valid iff no errors were emitted
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            ValidationResult::Valid => Vec::new(),
            ValidationResult::Invalid(errors) => errors,
        }
    }

    /// Errors attached to one field key
    pub fn errors_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors().iter().filter(move |e| e.key() == Some(key))
    }

    /// One line per error, for the presentation layer's error summary
    pub fn summary(&self) -> String {
        match self {
            ValidationResult::Valid => "VALID".to_string(),
            ValidationResult::Invalid(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "VALID"),
            ValidationResult::Invalid(errors) => write!(f, "INVALID ({} errors)", errors.len()),
        }
    }
}
