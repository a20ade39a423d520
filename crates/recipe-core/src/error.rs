//! Unified Error Model
//!
//! Validation failures are not errors; they are returned as data by the
//! validators. These variants cover everything else.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    #[error("SUBMIT/recipe {0} has already been submitted")]
    AlreadySubmitted(String),

    #[error("PARSE/{0}")]
    Parse(String),

    #[error("SERIALIZE/{0}")]
    Serialize(String),
}
