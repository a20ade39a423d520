//! Engine: the presentation layer's entry point
//!
//! Gates incoming Recipes through structural validation, tracks the ones
//! shown to the operator and turns operator actions into outbound
//! `Submission` messages.

use crate::audit::{AuditEntry, AuditEventType, AuditLog};
use crate::dispatch::{deferable, resolve_action, resolve_action_for, ActionVerb};
use crate::error::EngineError;
use crate::lifecycle::{SubmissionLedger, SubmitOutcome};
use parking_lot::{Mutex, MutexGuard};
use recipe_core::{Recipe, Submission, SubmissionData, UIComponentKind};
use recipe_policy::{redact_for_transmission, validate, ValidationError, ValidationResult, Whitelist};
use serde::{Deserialize, Serialize};

/// How a Recipe is shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "presentation", rename_all = "snake_case")]
pub enum Presentation {
    /// Structurally valid; rendered as the requested component
    Interactive {
        recipe_id: String,
        kind: UIComponentKind,
        action: ActionVerb,
        deferable: bool,
    },
    /// Structurally invalid; only the errors are shown
    ErrorSummary {
        recipe_id: String,
        errors: Vec<ValidationError>,
    },
}

impl Presentation {
    pub fn recipe_id(&self) -> &str {
        match self {
            Presentation::Interactive { recipe_id, .. } => recipe_id,
            Presentation::ErrorSummary { recipe_id, .. } => recipe_id,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Presentation::Interactive { .. })
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Presentation::Interactive { .. } => &[],
            Presentation::ErrorSummary { errors, .. } => errors,
        }
    }
}

/// Answer to an operator's submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum SubmissionResponse {
    /// Outbound message for the orchestrator
    Accepted(Submission),
    /// Field errors to show next to the inputs
    Rejected(Vec<ValidationError>),
    /// Nothing sent; the Recipe was already submitted
    AlreadySubmitted,
}

impl SubmissionResponse {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionResponse::Accepted(_))
    }
}

pub struct Engine {
    whitelist: Whitelist,
    ledger: SubmissionLedger,
    audit: Mutex<AuditLog>,
}

impl Engine {
    pub fn new(whitelist: Whitelist) -> Self {
        Self::with_audit_log(whitelist, AuditLog::new())
    }

    pub fn with_audit_log(whitelist: Whitelist, audit: AuditLog) -> Self {
        tracing::debug!(whitelist = %whitelist.name, "engine created");
        Self {
            whitelist,
            ledger: SubmissionLedger::new(),
            audit: Mutex::new(audit),
        }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Validate a Recipe and decide how it is shown.
    ///
    /// Only interactive Recipes are tracked; an error summary offers
    /// nothing to submit.
    pub fn present(&self, recipe: Recipe) -> Result<Presentation, EngineError> {
        let result = validate(&recipe, &self.whitelist);
        let recipe_id = recipe.id().to_string();

        let kind = match (result, recipe.component_kind().known()) {
            (ValidationResult::Valid, Some(kind)) => kind,
            (result, _) => {
                let errors = result.into_errors();
                tracing::warn!(
                    recipe_id = %recipe_id,
                    kind = %recipe.component_kind(),
                    errors = errors.len(),
                    "recipe blocked"
                );
                self.record(AuditEntry::new(AuditEventType::Blocked, &recipe).with_errors(&errors));
                return Ok(Presentation::ErrorSummary { recipe_id, errors });
            }
        };

        let action = resolve_action(kind);
        let entry = AuditEntry::new(AuditEventType::Presented, &recipe).with_action(action);
        self.ledger.register(recipe)?;
        self.record(entry);

        tracing::info!(recipe_id = %recipe_id, %kind, %action, "recipe presented");
        Ok(Presentation::Interactive {
            recipe_id,
            kind,
            action,
            deferable: deferable(kind),
        })
    }

    /// Submit operator data for a presented Recipe
    pub fn submit(&self, recipe_id: &str, data: SubmissionData) -> Result<SubmissionResponse, EngineError> {
        match self.ledger.submit(recipe_id, &data)? {
            SubmitOutcome::Accepted { data } => {
                // The Recipe is Submitted and immutable from here on
                let (submission, entry) = self.ledger.with_recipe(recipe_id, |recipe| {
                    let action = resolve_action_for(recipe.component_kind());
                    let entry =
                        AuditEntry::new(AuditEventType::SubmissionAccepted, recipe).with_action(action);
                    (outbound(recipe, action, &data), entry)
                })?;
                self.record(entry);

                tracing::info!(
                    recipe_id,
                    fields = submission.data.len(),
                    withheld = submission.withheld.len(),
                    "submission accepted"
                );
                Ok(SubmissionResponse::Accepted(submission))
            }
            SubmitOutcome::Rejected { errors } => {
                let entry = self.ledger.with_recipe(recipe_id, |recipe| {
                    AuditEntry::new(AuditEventType::SubmissionRejected, recipe).with_errors(&errors)
                })?;
                self.record(entry);

                tracing::debug!(recipe_id, errors = errors.len(), "submission rejected");
                Ok(SubmissionResponse::Rejected(errors))
            }
            SubmitOutcome::AlreadySubmitted => {
                let entry = self.ledger.with_recipe(recipe_id, |recipe| {
                    AuditEntry::new(AuditEventType::DuplicateSubmission, recipe)
                })?;
                self.record(entry);

                tracing::warn!(recipe_id, "duplicate submission ignored");
                Ok(SubmissionResponse::AlreadySubmitted)
            }
        }
    }

    /// Skip a deferable input without providing data
    pub fn skip(&self, recipe_id: &str) -> Result<Submission, EngineError> {
        self.conclude_without_data(recipe_id, ActionVerb::Skip)
    }

    /// Dismiss a Recipe without consequence
    pub fn cancel(&self, recipe_id: &str) -> Result<Submission, EngineError> {
        self.conclude_without_data(recipe_id, ActionVerb::Cancel)
    }

    /// Snapshot of a tracked Recipe
    pub fn recipe(&self, recipe_id: &str) -> Result<Recipe, EngineError> {
        Ok(self.ledger.snapshot(recipe_id)?)
    }

    pub fn audit(&self) -> MutexGuard<'_, AuditLog> {
        self.audit.lock()
    }

    // Decided under the Recipe's lock so a concurrent submit cannot interleave
    fn conclude_without_data(&self, recipe_id: &str, verb: ActionVerb) -> Result<Submission, EngineError> {
        let entry = self.ledger.with_recipe(recipe_id, |recipe| {
            if recipe.is_submitted() {
                return Err(EngineError::AlreadySubmitted(recipe_id.to_string()));
            }

            let kind = recipe.component_kind();
            if verb == ActionVerb::Skip && !kind.known().is_some_and(deferable) {
                return Err(EngineError::NotDeferable {
                    recipe_id: recipe_id.to_string(),
                    kind: kind.to_string(),
                });
            }

            let event_type = match verb {
                ActionVerb::Skip => AuditEventType::Skipped,
                _ => AuditEventType::Cancelled,
            };
            Ok(AuditEntry::new(event_type, recipe).with_action(verb))
        })??;
        self.record(entry);

        tracing::info!(recipe_id, action = %verb, "recipe concluded without data");
        Ok(Submission::action(recipe_id, verb.as_str()))
    }

    fn record(&self, entry: AuditEntry) {
        self.audit.lock().log(entry);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Whitelist::full())
    }
}

fn outbound(recipe: &Recipe, action: ActionVerb, data: &SubmissionData) -> Submission {
    let redacted = redact_for_transmission(recipe, data);
    let submission = if action.carries_data() {
        Submission::data(recipe.id(), redacted.data)
    } else {
        Submission::action(recipe.id(), action.as_str()).with_data(redacted.data)
    };
    submission.with_withheld(redacted.withheld)
}
