//! Audit trail
//!
//! Records every presentation and submission decision. Entries carry ids,
//! kinds, verbs and error messages, never submitted field values.

use crate::dispatch::ActionVerb;
use chrono::{DateTime, Utc};
use recipe_core::Recipe;
use recipe_policy::ValidationError;
use serde::{Deserialize, Serialize};

/// Default bound on retained entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// An audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub event_type: AuditEventType,

    pub recipe_id: String,

    /// Wire name of the component kind, as the agent sent it
    pub component_kind: String,

    /// Verb sent to the orchestrator, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionVerb>,

    /// Validation error messages
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AuditEntry {
    pub fn new(event_type: AuditEventType, recipe: &Recipe) -> Self {
        Self {
            id: generate_audit_id(),
            timestamp: Utc::now(),
            event_type,
            recipe_id: recipe.id().to_string(),
            component_kind: recipe.component_kind().raw().to_string(),
            action: None,
            errors: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: ActionVerb) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_errors(mut self, errors: &[ValidationError]) -> Self {
        self.errors = errors.iter().map(ToString::to_string).collect();
        self
    }
}

/// Type of audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Recipe passed structural validation and was shown
    Presented,
    /// Recipe failed structural validation; an error summary was shown
    Blocked,
    SubmissionAccepted,
    SubmissionRejected,
    /// Submission for an already-submitted Recipe
    DuplicateSubmission,
    Skipped,
    Cancelled,
}

/// Bounded audit log; oldest entries are dropped first
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    max_entries: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max,
        }
    }

    /// Log an entry, returning its id
    pub fn log(&mut self, entry: AuditEntry) -> String {
        let id = entry.id.clone();
        self.entries.push(entry);

        if self.entries.len() > self.max_entries {
            let drain_count = self.entries.len() - self.max_entries;
            self.entries.drain(0..drain_count);
        }
        id
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_since(&self, since: DateTime<Utc>) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.timestamp >= since).collect()
    }

    pub fn entries_for_recipe(&self, recipe_id: &str) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.recipe_id == recipe_id)
            .collect()
    }

    pub fn entries_of_type(&self, event_type: AuditEventType) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Blocked presentations and rejected submissions
    pub fn rejections(&self) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    AuditEventType::Blocked | AuditEventType::SubmissionRejected
                )
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Export to JSON Lines
    pub fn to_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self) -> AuditStats {
        let count = |t: AuditEventType| self.entries.iter().filter(|e| e.event_type == t).count();

        let presented = count(AuditEventType::Presented);
        let blocked = count(AuditEventType::Blocked);
        let accepted = count(AuditEventType::SubmissionAccepted);
        let rejected = count(AuditEventType::SubmissionRejected);
        let attempts = accepted + rejected;

        AuditStats {
            total: self.entries.len(),
            presented,
            blocked,
            accepted,
            rejected,
            duplicates: count(AuditEventType::DuplicateSubmission),
            skipped: count(AuditEventType::Skipped),
            cancelled: count(AuditEventType::Cancelled),
            block_rate: ratio(blocked, presented + blocked),
            rejection_rate: ratio(rejected, attempts),
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about audit entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total: usize,
    pub presented: usize,
    pub blocked: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub block_rate: f64,
    pub rejection_rate: f64,
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64
    } else {
        0.0
    }
}

fn generate_audit_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("aud_{:x}_{:04x}", timestamp, counter % 0xFFFF)
}
