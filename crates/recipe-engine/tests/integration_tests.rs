//! Integration tests for the engine with the shipped whitelist.
//!
//! Recipes arrive as JSON the way the orchestrator sends them and go through
//! presentation, submission and the outbound message.

use pretty_assertions::assert_eq;
use recipe_core::{Recipe, Submission, SubmissionData, SubmissionState, UIComponentKind};
use recipe_engine::{
    deferable, resolve_action, ActionVerb, AuditEventType, Engine, EngineError, Presentation,
    SubmissionResponse,
};
use recipe_policy::{ValidationError, Whitelist};
use std::sync::Arc;

/// Path to the whitelist relative to the workspace root
const WHITELIST_PATH: &str = "config/whitelist.yaml";

fn whitelist_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(WHITELIST_PATH)
}

fn engine() -> Engine {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    Engine::new(Whitelist::load(whitelist_path()).unwrap())
}

fn data(pairs: &[(&str, &str)]) -> SubmissionData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn receipt_recipe(id: &str) -> Recipe {
    Recipe::from_json(&format!(
        r#"{{
            "id": "{id}",
            "component_kind": "form",
            "title": "Log a receipt",
            "schema": {{
                "amount": {{ "type": "number", "label": "Amount" }},
                "date": {{ "type": "date", "label": "Date" }}
            }},
            "required_fields": ["amount", "date"],
            "is_submitted": false
        }}"#
    ))
    .unwrap()
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_shipped_whitelist_is_full() {
    let shipped = Whitelist::load(whitelist_path()).unwrap();
    assert_eq!(shipped, Whitelist::full());
}

// =============================================================================
// Receipt form scenarios
// =============================================================================

#[test]
fn test_missing_date_is_rejected() {
    let engine = engine();
    engine.present(receipt_recipe("r-a")).unwrap();

    let response = engine.submit("r-a", data(&[("amount", "12.50")])).unwrap();
    assert_eq!(
        response,
        SubmissionResponse::Rejected(vec![ValidationError::missing_required_field("date")])
    );
    assert_eq!(engine.recipe("r-a").unwrap().state(), SubmissionState::Draft);
}

#[test]
fn test_non_numeric_amount_is_rejected() {
    let engine = engine();
    engine.present(receipt_recipe("r-b")).unwrap();

    let response = engine
        .submit("r-b", data(&[("amount", "abc"), ("date", "2024-05-01")]))
        .unwrap();
    assert_eq!(
        response,
        SubmissionResponse::Rejected(vec![ValidationError::invalid_value("amount", "Must be a number")])
    );
}

#[test]
fn test_valid_receipt_is_accepted_once() {
    let engine = engine();
    engine.present(receipt_recipe("r-c")).unwrap();

    let values = data(&[("amount", "12.50"), ("date", "2024-05-01")]);
    let response = engine.submit("r-c", values.clone()).unwrap();
    assert_eq!(
        response,
        SubmissionResponse::Accepted(Submission::data("r-c", values.clone()))
    );

    let stored = engine.recipe("r-c").unwrap();
    assert!(stored.is_submitted());
    assert!(stored.submitted_at().is_some());
    assert_eq!(stored.submitted_data(), Some(&values));

    let again = engine
        .submit("r-c", data(&[("amount", "99"), ("date", "2024-06-01")]))
        .unwrap();
    assert_eq!(again, SubmissionResponse::AlreadySubmitted);
    assert_eq!(engine.recipe("r-c").unwrap().submitted_data(), Some(&values));
}

#[test]
fn test_outbound_submission_wire_shape() {
    let engine = engine();
    engine.present(receipt_recipe("r-wire")).unwrap();

    let response = engine
        .submit("r-wire", data(&[("amount", "12.50"), ("date", "2024-05-01")]))
        .unwrap();
    let SubmissionResponse::Accepted(submission) = response else {
        panic!("expected acceptance, got {:?}", response);
    };

    let json: serde_json::Value = serde_json::to_value(&submission).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "recipe_id": "r-wire",
            "data": { "amount": "12.50", "date": "2024-05-01" }
        })
    );
}

// =============================================================================
// Structural gate
// =============================================================================

#[test]
fn test_unknown_component_is_blocked() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{ "id": "r-d", "component_kind": "widget_xyz", "schema": {}, "required_fields": [] }"#,
    )
    .unwrap();

    let presentation = engine.present(recipe).unwrap();
    assert_eq!(
        presentation,
        Presentation::ErrorSummary {
            recipe_id: "r-d".to_string(),
            errors: vec![ValidationError::unsupported_component_kind("widget_xyz")],
        }
    );

    // Blocked Recipes are never interactable
    assert_eq!(
        engine.submit("r-d", SubmissionData::new()),
        Err(EngineError::UnknownRecipe("r-d".to_string()))
    );
}

#[test]
fn test_structural_errors_are_summarized_together() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{
            "id": "r-bad",
            "component_kind": "form",
            "schema": {
                "name": { "type": "vibe" },
                "code": { "type": "text", "validation": { "min_length": -1 } }
            },
            "required_fields": ["email"]
        }"#,
    )
    .unwrap();

    let presentation = engine.present(recipe).unwrap();
    let codes: Vec<&str> = presentation.errors().iter().map(|e| e.code()).collect();
    assert_eq!(
        codes,
        vec!["invalid_field_type", "invalid_value", "missing_required_field"]
    );
}

#[test]
fn test_dangling_required_key_blocks_any_kind() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{ "id": "r-ghost", "component_kind": "confirmation", "required_fields": ["ghost"] }"#,
    )
    .unwrap();

    let presentation = engine.present(recipe).unwrap();
    assert_eq!(
        presentation,
        Presentation::ErrorSummary {
            recipe_id: "r-ghost".to_string(),
            errors: vec![ValidationError::missing_required_field("ghost")],
        }
    );
    assert_eq!(
        engine.submit("r-ghost", SubmissionData::new()),
        Err(EngineError::UnknownRecipe("r-ghost".to_string()))
    );
}

#[test]
fn test_inconsistent_submission_state_is_refused() {
    let draft_with_data = r#"{
        "id": "r-x1",
        "component_kind": "form",
        "schema": { "a": { "type": "text" } },
        "is_submitted": false,
        "submitted_data": { "a": "old" }
    }"#;
    assert!(Recipe::from_json(draft_with_data).is_err());

    let submitted_without_data = r#"{
        "id": "r-x2",
        "component_kind": "form",
        "schema": { "a": { "type": "text" } },
        "is_submitted": true
    }"#;
    assert!(Recipe::from_json(submitted_without_data).is_err());
}

#[test]
fn test_submitted_recipe_from_wire_stays_submitted() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{
            "id": "r-done",
            "component_kind": "form",
            "schema": { "a": { "type": "text" } },
            "is_submitted": true,
            "submitted_data": { "a": "old" }
        }"#,
    )
    .unwrap();
    assert!(engine.present(recipe).unwrap().is_interactive());

    let response = engine.submit("r-done", data(&[("a", "new")])).unwrap();
    assert_eq!(response, SubmissionResponse::AlreadySubmitted);
    assert_eq!(
        engine.recipe("r-done").unwrap().submitted_data(),
        Some(&data(&[("a", "old")]))
    );
}

#[test]
fn test_legacy_whitelist_blocks_newer_kinds() {
    let engine = Engine::new(Whitelist::legacy());
    let recipe = Recipe::new(UIComponentKind::ServiceConnect);

    let presentation = engine.present(recipe).unwrap();
    assert!(!presentation.is_interactive());
    assert_eq!(
        presentation.errors(),
        &[ValidationError::unsupported_component_kind("service_connect")]
    );
}

// =============================================================================
// Action dispatch
// =============================================================================

#[test]
fn test_action_resolution() {
    assert_eq!(resolve_action(UIComponentKind::Confirmation), ActionVerb::Confirm);
    assert_eq!(resolve_action(UIComponentKind::Form), ActionVerb::Submit);
    assert!(deferable(UIComponentKind::Form));
    assert!(!deferable(UIComponentKind::Confirmation));
}

#[test]
fn test_confirmation_sends_verb() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{ "id": "r-confirm", "component_kind": "confirmation", "title": "Delete 3 files?" }"#,
    )
    .unwrap();

    let presentation = engine.present(recipe).unwrap();
    assert_eq!(
        presentation,
        Presentation::Interactive {
            recipe_id: "r-confirm".to_string(),
            kind: UIComponentKind::Confirmation,
            action: ActionVerb::Confirm,
            deferable: false,
        }
    );

    let response = engine.submit("r-confirm", SubmissionData::new()).unwrap();
    let SubmissionResponse::Accepted(submission) = response else {
        panic!("expected acceptance, got {:?}", response);
    };
    assert_eq!(
        serde_json::to_value(&submission).unwrap(),
        serde_json::json!({ "recipe_id": "r-confirm", "action": "confirm" })
    );
}

#[test]
fn test_display_kind_submits_empty_data() {
    let engine = engine();
    engine
        .present(Recipe::from_json(r#"{ "id": "r-weather", "component_kind": "weather" }"#).unwrap())
        .unwrap();

    let response = engine.submit("r-weather", SubmissionData::new()).unwrap();
    let SubmissionResponse::Accepted(submission) = response else {
        panic!("expected acceptance, got {:?}", response);
    };
    assert_eq!(
        serde_json::to_value(&submission).unwrap(),
        serde_json::json!({ "recipe_id": "r-weather", "data": {} })
    );
}

#[test]
fn test_skip_and_cancel() {
    let engine = engine();
    engine.present(receipt_recipe("r-skip")).unwrap();
    engine
        .present(Recipe::from_json(r#"{ "id": "r-approve", "component_kind": "approval" }"#).unwrap())
        .unwrap();

    assert_eq!(engine.skip("r-skip").unwrap(), Submission::action("r-skip", "skip"));
    assert!(matches!(
        engine.skip("r-approve"),
        Err(EngineError::NotDeferable { .. })
    ));
    assert_eq!(engine.cancel("r-approve").unwrap(), Submission::action("r-approve", "cancel"));

    // A skipped form can still be filled in later
    let response = engine
        .submit("r-skip", data(&[("amount", "1"), ("date", "2024-05-01")]))
        .unwrap();
    assert!(response.is_accepted());
    assert_eq!(
        engine.cancel("r-skip"),
        Err(EngineError::AlreadySubmitted("r-skip".to_string()))
    );
}

// =============================================================================
// Secrets
// =============================================================================

#[test]
fn test_api_key_never_leaves_device() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{
            "id": "r-key",
            "component_kind": "api_key_input",
            "schema": { "api_key": { "type": "text" } },
            "required_fields": ["api_key"]
        }"#,
    )
    .unwrap();
    engine.present(recipe).unwrap();

    let response = engine.submit("r-key", data(&[("api_key", "sk-live-123")])).unwrap();
    let SubmissionResponse::Accepted(submission) = response else {
        panic!("expected acceptance, got {:?}", response);
    };
    assert!(submission.data.is_empty());
    assert_eq!(submission.withheld, vec!["api_key".to_string()]);
    assert_eq!(
        serde_json::to_value(&submission).unwrap(),
        serde_json::json!({ "recipe_id": "r-key", "data": {}, "withheld": ["api_key"] })
    );

    // Stored locally in full
    let stored = engine.recipe("r-key").unwrap();
    assert_eq!(stored.submitted_data(), Some(&data(&[("api_key", "sk-live-123")])));

    // Neither the serialized Recipe nor the audit trail carries the value
    let wire = stored.to_json().unwrap();
    assert!(!wire.contains("sk-live-123"));
    assert!(wire.contains("[REDACTED]"));
    assert!(!engine.audit().to_jsonl().contains("sk-live-123"));
}

#[test]
fn test_sensitive_values_are_scrubbed() {
    let engine = engine();
    let recipe = Recipe::from_json(
        r#"{
            "id": "r-note",
            "component_kind": "form",
            "schema": {
                "note": { "type": "text" },
                "password": { "type": "text", "secret": true }
            }
        }"#,
    )
    .unwrap();
    engine.present(recipe).unwrap();

    let response = engine
        .submit(
            "r-note",
            data(&[("note", "card 4111111111111111 please"), ("password", "hunter2")]),
        )
        .unwrap();
    let SubmissionResponse::Accepted(submission) = response else {
        panic!("expected acceptance, got {:?}", response);
    };
    assert_eq!(submission.data, data(&[("note", "card [REDACTED] please")]));
    assert_eq!(submission.withheld, vec!["password".to_string()]);
}

// =============================================================================
// Concurrency and audit
// =============================================================================

#[test]
fn test_concurrent_double_submit() {
    let engine = Arc::new(engine());
    engine.present(receipt_recipe("r-race")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let amount = format!("{}.00", i + 1);
                engine
                    .submit("r-race", data(&[("amount", amount.as_str()), ("date", "2024-05-01")]))
                    .unwrap()
            })
        })
        .collect();

    let responses: Vec<SubmissionResponse> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = responses.iter().filter(|r| r.is_accepted()).count();
    let duplicates = responses
        .iter()
        .filter(|r| **r == SubmissionResponse::AlreadySubmitted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 7);

    let audit = engine.audit();
    assert_eq!(audit.entries_of_type(AuditEventType::SubmissionAccepted).len(), 1);
    assert_eq!(audit.entries_of_type(AuditEventType::DuplicateSubmission).len(), 7);
}

#[test]
fn test_audit_trail_for_recipe() {
    let engine = engine();
    engine.present(receipt_recipe("r-trail")).unwrap();
    engine.submit("r-trail", data(&[("amount", "x")])).unwrap();
    engine
        .submit("r-trail", data(&[("amount", "5"), ("date", "2024-05-01")]))
        .unwrap();

    let audit = engine.audit();
    let events: Vec<AuditEventType> = audit
        .entries_for_recipe("r-trail")
        .iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        events,
        vec![
            AuditEventType::Presented,
            AuditEventType::SubmissionRejected,
            AuditEventType::SubmissionAccepted,
        ]
    );

    let rejection = audit.rejections()[0];
    assert_eq!(rejection.component_kind, "form");
    assert_eq!(
        rejection.errors,
        vec![
            "Missing required field: date".to_string(),
            "amount: Must be a number".to_string(),
        ]
    );
}
