//! Recipe Engine: what happens after a Recipe arrives
//!
//! - [`dispatch`]: which verb an interaction sends back, and which inputs may be skipped
//! - [`lifecycle`]: the one-way Draft → Submitted transition, serialized per Recipe
//! - [`audit`]: a bounded trail of presentations and submission decisions
//! - [`engine`]: the facade tying them to `recipe-policy` validation
//!
//! # Example
//!
//! ```
//! use recipe_core::{FieldType, Recipe, SchemaField, SubmissionData, UIComponentKind};
//! use recipe_engine::{Engine, SubmissionResponse};
//!
//! let engine = Engine::default();
//! let recipe = Recipe::new(UIComponentKind::Form)
//!     .with_field("amount", SchemaField::new(FieldType::Number))
//!     .require("amount");
//! let id = recipe.id().to_string();
//!
//! assert!(engine.present(recipe).unwrap().is_interactive());
//!
//! let mut data = SubmissionData::new();
//! data.insert("amount".to_string(), "12.50".to_string());
//! assert!(engine.submit(&id, data.clone()).unwrap().is_accepted());
//! assert_eq!(engine.submit(&id, data).unwrap(), SubmissionResponse::AlreadySubmitted);
//! ```

pub mod audit;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lifecycle;

pub use audit::{AuditEntry, AuditEventType, AuditLog, AuditStats};
pub use dispatch::{deferable, resolve_action, resolve_action_for, ActionVerb};
pub use engine::{Engine, Presentation, SubmissionResponse};
pub use error::{EngineError, LedgerError};
pub use lifecycle::{submit, SubmissionLedger, SubmitOutcome};
