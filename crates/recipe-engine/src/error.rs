//! Engine errors
//!
//! Validation failures and duplicate submissions are outcomes, not errors.
//! These cover calls that cannot be answered at all.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("LEDGER/unknown recipe {0}")]
    UnknownRecipe(String),

    #[error("LEDGER/recipe {0} is already registered")]
    DuplicateRecipe(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("ENGINE/unknown recipe {0}")]
    UnknownRecipe(String),

    #[error("ENGINE/recipe {0} was already presented")]
    DuplicateRecipe(String),

    #[error("ACTION/recipe {recipe_id} ({kind}) cannot be skipped")]
    NotDeferable { recipe_id: String, kind: String },

    #[error("ACTION/recipe {0} has already been submitted")]
    AlreadySubmitted(String),
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownRecipe(id) => EngineError::UnknownRecipe(id),
            LedgerError::DuplicateRecipe(id) => EngineError::DuplicateRecipe(id),
        }
    }
}
