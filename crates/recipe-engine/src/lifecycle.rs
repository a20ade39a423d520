//! Submission lifecycle
//!
//! A Recipe moves Draft → Submitted exactly once. The transition is a single
//! check-validate-set performed while holding exclusive access to the
//! Recipe, so two near-simultaneous submissions can never both be accepted.

use crate::error::LedgerError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use recipe_core::{Recipe, SubmissionData, SubmissionState};
use recipe_policy::{validate_submission, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Data validated and stored; the Recipe is now Submitted
    Accepted { data: SubmissionData },
    /// Data failed validation; the Recipe stays Draft
    Rejected { errors: Vec<ValidationError> },
    /// The Recipe was already Submitted; nothing changed
    AlreadySubmitted,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Attempt the Draft → Submitted transition on an exclusively borrowed Recipe
pub fn submit(recipe: &mut Recipe, data: &SubmissionData) -> SubmitOutcome {
    if recipe.is_submitted() {
        return SubmitOutcome::AlreadySubmitted;
    }

    let result = validate_submission(data, recipe);
    if !result.is_valid() {
        return SubmitOutcome::Rejected {
            errors: result.into_errors(),
        };
    }

    match recipe.accept_submission(data) {
        Ok(()) => SubmitOutcome::Accepted { data: data.clone() },
        Err(_) => SubmitOutcome::AlreadySubmitted,
    }
}

/// Live Recipes keyed by id, each behind its own lock.
///
/// Submissions for one id are serialized; different ids never contend.
#[derive(Debug, Default)]
pub struct SubmissionLedger {
    recipes: DashMap<String, Arc<Mutex<Recipe>>>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a Recipe. Ids are never reused, so a second registration of the
    /// same id is refused.
    pub fn register(&self, recipe: Recipe) -> Result<(), LedgerError> {
        match self.recipes.entry(recipe.id().to_string()) {
            Entry::Occupied(entry) => Err(LedgerError::DuplicateRecipe(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(recipe)));
                Ok(())
            }
        }
    }

    /// Submit data for a tracked Recipe
    pub fn submit(&self, id: &str, data: &SubmissionData) -> Result<SubmitOutcome, LedgerError> {
        let cell = self.cell(id)?;
        let mut recipe = cell.lock();
        Ok(submit(&mut recipe, data))
    }

    /// Run `f` with the Recipe locked; submissions for the same id wait
    pub fn with_recipe<R>(&self, id: &str, f: impl FnOnce(&Recipe) -> R) -> Result<R, LedgerError> {
        let cell = self.cell(id)?;
        let recipe = cell.lock();
        Ok(f(&recipe))
    }

    /// Copy of the Recipe's current state
    pub fn snapshot(&self, id: &str) -> Result<Recipe, LedgerError> {
        self.with_recipe(id, Recipe::clone)
    }

    pub fn state(&self, id: &str) -> Result<SubmissionState, LedgerError> {
        self.with_recipe(id, Recipe::state)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    // Clone the Arc so the map shard is released before the Recipe is locked
    fn cell(&self, id: &str) -> Result<Arc<Mutex<Recipe>>, LedgerError> {
        self.recipes
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::UnknownRecipe(id.to_string()))
    }
}
