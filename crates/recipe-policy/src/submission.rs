//! Submission validation
//!
//! Checks operator-entered values against a Recipe's schema before they are
//! accepted.

use crate::structural::compile_pattern;
use crate::verdict::{ValidationError, ValidationResult};
use lazy_static::lazy_static;
use recipe_core::{FieldType, Recipe, SchemaField, SubmissionData};
use regex::Regex;

/// Minimum digits in a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

lazy_static! {
    /// Conventional local@domain.tld address
    static ref EMAIL: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,64}$").unwrap();
}

/// Validate submitted values against a Recipe.
///
/// Required fields must be present and non-blank. Every other check runs
/// only on non-empty values of keys the schema knows; keys outside the
/// schema are ignored.
pub fn validate_submission(data: &SubmissionData, recipe: &Recipe) -> ValidationResult {
    let mut errors = Vec::new();

    for key in recipe.effective_required_fields() {
        let value = data.get(key).map(String::as_str).unwrap_or("");
        if value.trim().is_empty() {
            errors.push(ValidationError::missing_required_field(key));
        }
    }

    for (key, value) in data {
        let Some(field) = recipe.field(key) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        if let Some(reason) = check_type(field, value) {
            errors.push(ValidationError::invalid_value(key, reason));
        }
        check_rule(key, field, value, &mut errors);
    }

    let result = ValidationResult::from_errors(errors);
    tracing::debug!(
        recipe_id = recipe.id(),
        fields = data.len(),
        errors = result.errors().len(),
        "submission validation"
    );
    result
}

fn check_type(field: &SchemaField, value: &str) -> Option<&'static str> {
    match field.field_type.known()? {
        FieldType::Email if !EMAIL.is_match(value) => Some("Invalid email format"),
        FieldType::Phone if !is_phone(value) => Some("Invalid phone format"),
        FieldType::Url if url::Url::parse(value).is_err() => Some("Invalid URL"),
        FieldType::Number | FieldType::Currency => check_number(value),
        _ => None,
    }
}

fn check_rule(key: &str, field: &SchemaField, value: &str, errors: &mut Vec<ValidationError>) {
    let Some(rule) = &field.validation else {
        return;
    };
    let length = value.chars().count() as i64;

    // Negative limits are structural errors and never reach here in practice
    if let Some(min) = rule.min_length.filter(|m| *m >= 0) {
        if length < min {
            errors.push(ValidationError::invalid_value(key, format!("Minimum {} characters", min)));
        }
    }
    if let Some(max) = rule.max_length.filter(|m| *m >= 0) {
        if length > max {
            errors.push(ValidationError::invalid_value(key, format!("Maximum {} characters", max)));
        }
    }
    if let Some(pattern) = rule.pattern.as_deref().and_then(compile_pattern) {
        if !pattern.is_match(value) {
            errors.push(ValidationError::invalid_value(key, "Does not match required format"));
        }
    }
}

fn is_phone(value: &str) -> bool {
    value.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
}

fn check_number(value: &str) -> Option<&'static str> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => None,
        // Digits mean an overflowing literal rather than `inf` or `NaN`
        Ok(_) if value.bytes().any(|b| b.is_ascii_digit()) => Some("Number is out of range"),
        _ => Some("Must be a number"),
    }
}
