//! Structural validation
//!
//! Checks a Recipe against the whitelist and its own consistency rules
//! before anything is shown. A Recipe that fails here must never be offered
//! for interaction.

use crate::verdict::{ValidationError, ValidationResult};
use crate::whitelist::Whitelist;
use recipe_core::{Recipe, UIComponentKind};
use regex::Regex;

/// Validate a Recipe's structure against a whitelist.
///
/// Pure: identical input always yields an identical result. Errors keep
/// emission order:
///
/// 1. unsupported component kind
/// 2. for input kinds: empty schema, disallowed field types, malformed
///    validation rules
/// 3. required keys missing from the schema, for every kind
/// 4. title length
pub fn validate(recipe: &Recipe, whitelist: &Whitelist) -> ValidationResult {
    let mut errors = Vec::new();
    let kind = recipe.component_kind();

    if !whitelist.allows_kind(kind) {
        errors.push(ValidationError::unsupported_component_kind(kind.raw()));
    }

    if let Some(kind) = kind.known().filter(|k| k.is_input()) {
        check_input_schema(recipe, kind, whitelist, &mut errors);
    }

    // Every kind: a required key the schema lacks can never be filled in
    for key in recipe.effective_required_fields() {
        if recipe.field(key).is_none() {
            errors.push(ValidationError::missing_required_field(key));
        }
    }

    if let (Some(max), Some(title)) = (whitelist.max_title_length, recipe.title()) {
        if title.chars().count() > max {
            errors.push(ValidationError::invalid_value(
                "title",
                format!("Title cannot exceed {} characters", max),
            ));
        }
    }

    let result = ValidationResult::from_errors(errors);
    tracing::debug!(
        recipe_id = recipe.id(),
        kind = %kind,
        errors = result.errors().len(),
        "structural validation"
    );
    result
}

fn check_input_schema(
    recipe: &Recipe,
    kind: UIComponentKind,
    whitelist: &Whitelist,
    errors: &mut Vec<ValidationError>,
) {
    let schema = recipe.schema();

    // A date picker's value is implicit
    if schema.is_empty() && kind != UIComponentKind::DatePicker {
        errors.push(ValidationError::EmptySchema);
    }

    for (key, field) in schema {
        if !whitelist.allows_field_type(&field.field_type) {
            errors.push(ValidationError::invalid_field_type(
                key,
                whitelist.expected_field_types(),
                field.field_type.raw(),
            ));
        }
    }

    for (key, field) in schema {
        let Some(rule) = &field.validation else {
            continue;
        };

        if rule.min_length.is_some_and(|min| min < 0) {
            errors.push(ValidationError::invalid_value(key, "minLength cannot be negative"));
        }
        if rule.max_length.is_some_and(|max| max < 0) {
            errors.push(ValidationError::invalid_value(key, "maxLength cannot be negative"));
        }
        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min >= 0 && max >= 0 && min > max {
                tracing::warn!(
                    recipe_id = recipe.id(),
                    field = %key,
                    min,
                    max,
                    "minLength exceeds maxLength; no value can satisfy both"
                );
            }
        }
        if let Some(pattern) = &rule.pattern {
            if compile_pattern(pattern).is_none() {
                errors.push(ValidationError::invalid_value(key, "Invalid pattern"));
            }
        }
    }
}

/// Compile a field pattern anchored to the whole value
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).ok()
}
