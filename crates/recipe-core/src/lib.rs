//! Recipe Core: vocabulary and data model
//!
//! A Recipe is the declarative description of one operator interaction an
//! agent asks for: a component kind from a closed vocabulary plus a typed
//! field schema. This crate defines the vocabulary, the Recipe itself and the
//! outbound submission message. Validation lives in `recipe-policy`; the
//! submission lifecycle in `recipe-engine`.

pub mod data_model;
pub mod error;
pub mod vocabulary;

pub use data_model::{
    FieldValidationRule, Recipe, SchemaField, Submission, SubmissionData, SubmissionState,
};
pub use error::RecipeError;
pub use vocabulary::{ComponentCategory, FieldType, Named, UIComponentKind, UnknownName, Vocab};

/// Placeholder substituted for redacted content
pub const REDACTED: &str = "[REDACTED]";
