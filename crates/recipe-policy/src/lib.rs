//! Recipe Policy: the trust boundary between agent output and the operator
//!
//! Everything an agent asks the operator for passes through here twice:
//!
//! ```text
//! Recipe ──▶ validate (whitelist + structure) ──▶ shown / error summary
//!                                                        │
//!                                          operator key/value data
//!                                                        ▼
//!                         validate_submission (schema) ──▶ accepted / field errors
//!                                                        │
//!                              redact_for_transmission ──▶ outbound data
//! ```
//!
//! All validators are pure functions over borrowed data and may be called
//! concurrently from any number of threads.
//!
//! # Example
//!
//! ```
//! use recipe_core::{FieldType, Recipe, SchemaField, SubmissionData, UIComponentKind};
//! use recipe_policy::{validate, validate_submission, ValidationError, Whitelist};
//!
//! let recipe = Recipe::new(UIComponentKind::Form)
//!     .with_field("amount", SchemaField::new(FieldType::Number))
//!     .with_field("date", SchemaField::new(FieldType::Date))
//!     .require("amount")
//!     .require("date");
//!
//! assert!(validate(&recipe, &Whitelist::full()).is_valid());
//!
//! let mut data = SubmissionData::new();
//! data.insert("amount".to_string(), "12.50".to_string());
//!
//! let result = validate_submission(&data, &recipe);
//! assert_eq!(result.errors(), &[ValidationError::missing_required_field("date")]);
//! ```

pub mod redaction;
pub mod structural;
pub mod submission;
pub mod verdict;
pub mod whitelist;

pub use redaction::{contains_sensitive, is_secret, redact_for_transmission, sanitize, RedactedData};
pub use structural::validate;
pub use submission::validate_submission;
pub use verdict::{ValidationError, ValidationResult};
pub use whitelist::{Whitelist, WhitelistError, DEFAULT_MAX_TITLE_LENGTH};

/// Validate a Recipe against the full whitelist
pub fn validate_with_defaults(recipe: &recipe_core::Recipe) -> ValidationResult {
    validate(recipe, &Whitelist::full())
}
