//! Secret handling for outbound submissions
//!
//! Secret-bearing fields (API keys, credentials) stay on the device: their
//! values are withheld from anything sent to the orchestrator. Other values
//! are scrubbed of recognizable sensitive data.

use lazy_static::lazy_static;
use recipe_core::{Recipe, SubmissionData, REDACTED};
use regex::Regex;

lazy_static! {
    /// Sensitive data that must never be transmitted
    static ref SENSITIVE_PATTERNS: Vec<Regex> = vec![
        // Card numbers
        Regex::new(r"\b\d{16}\b").unwrap(),
        // SSN
        Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
        // Inline passwords
        Regex::new(r"(?i)\bpassword\s*[:=]\s*\S+").unwrap(),
        // Inline API keys
        Regex::new(r"(?i)\b(api[_-]?key|secret[_-]?key)\s*[:=]\s*\S+").unwrap(),
    ];
}

/// Outbound data after redaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactedData {
    /// Values safe to transmit
    pub data: SubmissionData,
    /// Keys whose values were withheld entirely
    pub withheld: Vec<String>,
}

/// Whether a field's value must never leave the device.
///
/// Every field of an API-key or credentials Recipe is secret, as is any field
/// flagged `secret`.
pub fn is_secret(recipe: &Recipe, key: &str) -> bool {
    recipe.is_secret_field(key)
}

/// Prepare submitted data for transmission to the orchestrator
pub fn redact_for_transmission(recipe: &Recipe, data: &SubmissionData) -> RedactedData {
    let mut redacted = RedactedData::default();

    for (key, value) in data {
        if is_secret(recipe, key) {
            redacted.withheld.push(key.clone());
        } else {
            redacted.data.insert(key.clone(), sanitize(value));
        }
    }

    if !redacted.withheld.is_empty() {
        tracing::info!(
            recipe_id = recipe.id(),
            withheld = redacted.withheld.len(),
            "withheld secret fields from transmission"
        );
    }
    redacted
}

/// Replace sensitive substrings with a placeholder
pub fn sanitize(text: &str) -> String {
    SENSITIVE_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, REDACTED).into_owned()
        })
}

/// Whether text contains anything `sanitize` would replace
pub fn contains_sensitive(text: &str) -> bool {
    SENSITIVE_PATTERNS.iter().any(|p| p.is_match(text))
}
