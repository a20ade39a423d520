//! Data Model: Recipe, SchemaField, Submission
use crate::error::RecipeError;
use crate::vocabulary::{FieldType, UIComponentKind, Vocab};
use crate::REDACTED;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Operator-entered values keyed by field key
pub type SubmissionData = BTreeMap<String, String>;

/// Per-field validation rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationRule {
    /// Minimum length in characters. Signed so that a negative value from
    /// the agent can be reported instead of rejected at parse time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    /// Regular expression the whole value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Field-level required flag, merged with the Recipe's required list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: i64) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: i64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }
}

/// A typed, named field of a Recipe schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    #[serde(rename = "type")]
    pub field_type: Vocab<FieldType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Choices for select and multi-select fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidationRule>,

    /// Value must never leave the device
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,
}

impl SchemaField {
    pub fn new(field_type: FieldType) -> Self {
        Self::from_vocab(Vocab::Known(field_type))
    }

    /// Field whose type is given by its raw wire name
    pub fn from_raw(raw_type: &str) -> Self {
        Self::from_vocab(Vocab::parse(raw_type))
    }

    fn from_vocab(field_type: Vocab<FieldType>) -> Self {
        Self {
            field_type,
            label: None,
            placeholder: None,
            options: None,
            validation: None,
            secret: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validation(mut self, rule: FieldValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn is_required_by_rule(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|rule| rule.required)
            .unwrap_or(false)
    }
}

/// Submission state of a Recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    Draft,
    Submitted,
}

/// Declarative description of one interaction requested by the agent.
///
/// Construction and the schema builders consume the Recipe; once it is
/// handed to the engine the only write is [`Recipe::accept_submission`].
///
/// On the wire, `submitted_data` is present exactly when `is_submitted` is
/// true; payloads that disagree are refused at parse time. Serialized
/// Recipes never carry secret values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRecipe", into = "WireRecipe")]
pub struct Recipe {
    id: String,
    component_kind: Vocab<UIComponentKind>,
    schema: BTreeMap<String, SchemaField>,
    required_fields: Vec<String>,
    title: Option<String>,
    description: Option<String>,
    /// Orchestrator task this Recipe gathers input for
    task_id: Option<String>,
    created_at: DateTime<Utc>,
    is_submitted: bool,
    submitted_data: Option<SubmissionData>,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct WireRecipe {
    id: String,

    #[serde(rename = "component_kind", alias = "component_type")]
    component_kind: Vocab<UIComponentKind>,

    #[serde(default)]
    schema: BTreeMap<String, SchemaField>,

    #[serde(default)]
    required_fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,

    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,

    #[serde(default)]
    is_submitted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    submitted_data: Option<SubmissionData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    submitted_at: Option<DateTime<Utc>>,
}

impl TryFrom<WireRecipe> for Recipe {
    type Error = String;

    fn try_from(wire: WireRecipe) -> Result<Self, Self::Error> {
        match (wire.is_submitted, &wire.submitted_data) {
            (true, None) => {
                return Err(format!("recipe {} is submitted but has no submitted_data", wire.id));
            }
            (false, Some(_)) => {
                return Err(format!("recipe {} has submitted_data but is not submitted", wire.id));
            }
            _ => {}
        }
        if !wire.is_submitted && wire.submitted_at.is_some() {
            return Err(format!("recipe {} has submitted_at but is not submitted", wire.id));
        }

        Ok(Recipe {
            id: wire.id,
            component_kind: wire.component_kind,
            schema: wire.schema,
            required_fields: wire.required_fields,
            title: wire.title,
            description: wire.description,
            task_id: wire.task_id,
            created_at: wire.created_at,
            is_submitted: wire.is_submitted,
            submitted_data: wire.submitted_data,
            submitted_at: wire.submitted_at,
        })
    }
}

impl From<Recipe> for WireRecipe {
    fn from(recipe: Recipe) -> Self {
        let submitted_data = recipe.submitted_data.as_ref().map(|data| {
            data.iter()
                .map(|(key, value)| {
                    let value = if recipe.is_secret_field(key) {
                        REDACTED.to_string()
                    } else {
                        value.clone()
                    };
                    (key.clone(), value)
                })
                .collect()
        });

        WireRecipe {
            id: recipe.id,
            component_kind: recipe.component_kind,
            schema: recipe.schema,
            required_fields: recipe.required_fields,
            title: recipe.title,
            description: recipe.description,
            task_id: recipe.task_id,
            created_at: recipe.created_at,
            is_submitted: recipe.is_submitted,
            submitted_data,
            submitted_at: recipe.submitted_at,
        }
    }
}

impl Recipe {
    /// Create a draft Recipe with a fresh id
    pub fn new(kind: impl Into<Vocab<UIComponentKind>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            component_kind: kind.into(),
            schema: BTreeMap::new(),
            required_fields: Vec::new(),
            title: None,
            description: None,
            task_id: None,
            created_at: Utc::now(),
            is_submitted: false,
            submitted_data: None,
            submitted_at: None,
        }
    }

    /// Create a draft Recipe whose kind is given by its raw wire name
    pub fn from_raw_kind(raw_kind: &str) -> Self {
        Self::new(Vocab::<UIComponentKind>::parse(raw_kind))
    }

    pub fn with_field(mut self, key: impl Into<String>, field: SchemaField) -> Self {
        self.schema.insert(key.into(), field);
        self
    }

    /// Mark a field key as required. Keys are kept in insertion order and
    /// never duplicated.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.required_fields.contains(&key) {
            self.required_fields.push(key);
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn for_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn component_kind(&self) -> &Vocab<UIComponentKind> {
        &self.component_kind
    }

    pub fn schema(&self) -> &BTreeMap<String, SchemaField> {
        &self.schema
    }

    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.schema.get(key)
    }

    /// Whether the value under `key` must never leave the device: every
    /// field of a secret-collecting kind, and any field flagged `secret`
    pub fn is_secret_field(&self, key: &str) -> bool {
        let kind_collects_secrets = self
            .component_kind
            .known()
            .is_some_and(|k| k.collects_secrets());

        kind_collects_secrets || self.field(key).is_some_and(|f| f.secret)
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// Required keys: the explicit list first, then fields whose rule says
    /// `required: true`, without duplicates.
    pub fn effective_required_fields(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for key in &self.required_fields {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        for (key, field) in &self.schema {
            if field.is_required_by_rule() && !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn submitted_data(&self) -> Option<&SubmissionData> {
        self.submitted_data.as_ref()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn state(&self) -> SubmissionState {
        if self.is_submitted {
            SubmissionState::Submitted
        } else {
            SubmissionState::Draft
        }
    }

    /// Transition Draft → Submitted, storing a copy of `data`.
    ///
    /// The guard and the write happen under the same exclusive borrow. No
    /// validation happens here; callers validate first.
    pub fn accept_submission(&mut self, data: &SubmissionData) -> Result<(), RecipeError> {
        if self.is_submitted {
            return Err(RecipeError::AlreadySubmitted(self.id.clone()));
        }

        self.submitted_data = Some(data.clone());
        self.submitted_at = Some(Utc::now());
        self.is_submitted = true;

        tracing::debug!(recipe_id = %self.id, fields = data.len(), "recipe submitted");
        Ok(())
    }

    /// Parse the upstream wire shape
    pub fn from_json(json: &str) -> Result<Self, RecipeError> {
        serde_json::from_str(json).map_err(|e| RecipeError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RecipeError> {
        serde_json::to_string(self).map_err(|e| RecipeError::Serialize(e.to_string()))
    }
}

/// Outbound message from the presentation layer to the orchestrator.
///
/// Data submissions always carry `data`, even when it is empty; non-data
/// actions carry `action` and only the data the operator entered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Submission {
    pub recipe_id: String,

    #[serde(default)]
    pub data: SubmissionData,

    /// Action verb name (`confirm`, `approve`, `auth`, `execute`, `skip`,
    /// `cancel`). Absent for plain data submissions.
    #[serde(default)]
    pub action: Option<String>,

    /// Keys whose values were withheld from transmission
    #[serde(default)]
    pub withheld: Vec<String>,
}

impl Serialize for Submission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let with_data = self.action.is_none() || !self.data.is_empty();
        let len = 1
            + usize::from(with_data)
            + usize::from(self.action.is_some())
            + usize::from(!self.withheld.is_empty());

        let mut state = serializer.serialize_struct("Submission", len)?;
        state.serialize_field("recipe_id", &self.recipe_id)?;
        if with_data {
            state.serialize_field("data", &self.data)?;
        } else {
            state.skip_field("data")?;
        }
        match &self.action {
            Some(action) => state.serialize_field("action", action)?,
            None => state.skip_field("action")?,
        }
        if self.withheld.is_empty() {
            state.skip_field("withheld")?;
        } else {
            state.serialize_field("withheld", &self.withheld)?;
        }
        state.end()
    }
}

impl Submission {
    pub fn data(recipe_id: impl Into<String>, data: SubmissionData) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            data,
            action: None,
            withheld: Vec::new(),
        }
    }

    pub fn action(recipe_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            data: SubmissionData::new(),
            action: Some(action.into()),
            withheld: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: SubmissionData) -> Self {
        self.data = data;
        self
    }

    pub fn with_withheld(mut self, keys: Vec<String>) -> Self {
        self.withheld = keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn receipt_form() -> Recipe {
        Recipe::new(UIComponentKind::Form)
            .with_field("amount", SchemaField::new(FieldType::Number).with_label("Amount"))
            .with_field("date", SchemaField::new(FieldType::Date))
            .require("amount")
            .require("date")
            .require("amount")
    }

    #[test]
    fn test_new_recipe_is_draft() {
        let recipe = receipt_form();
        assert_eq!(recipe.state(), SubmissionState::Draft);
        assert!(recipe.submitted_data().is_none());
        assert!(Uuid::parse_str(recipe.id()).is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Recipe::new(UIComponentKind::Confirmation);
        let b = Recipe::new(UIComponentKind::Confirmation);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_require_deduplicates() {
        let recipe = receipt_form();
        assert_eq!(recipe.required_fields(), &["amount".to_string(), "date".to_string()]);
    }

    #[test]
    fn test_effective_required_fields() {
        let recipe = receipt_form().with_field(
            "note",
            SchemaField::new(FieldType::Text)
                .with_validation(FieldValidationRule::new().required()),
        );
        assert_eq!(recipe.effective_required_fields(), vec!["amount", "date", "note"]);
    }

    #[test]
    fn test_accept_submission_once() {
        let mut recipe = receipt_form();
        let mut data = SubmissionData::new();
        data.insert("amount".to_string(), "12.50".to_string());

        recipe.accept_submission(&data).unwrap();
        assert_eq!(recipe.state(), SubmissionState::Submitted);
        assert_eq!(recipe.submitted_data(), Some(&data));
        assert!(recipe.submitted_at().is_some());

        let mut other = SubmissionData::new();
        other.insert("amount".to_string(), "99".to_string());
        let err = recipe.accept_submission(&other).unwrap_err();
        assert!(matches!(err, RecipeError::AlreadySubmitted(_)));
        assert_eq!(recipe.submitted_data(), Some(&data));
    }

    #[test]
    fn test_parse_wire_shape() {
        let json = r#"{
            "id": "r-1",
            "component_kind": "form",
            "schema": {
                "amount": {"type": "number", "label": "Amount",
                           "validation": {"min_length": -1}},
                "category": {"type": "select", "options": ["Food", "Transport"]},
                "mood": {"type": "vibe"}
            },
            "required_fields": ["amount"],
            "title": "Receipt",
            "is_submitted": false
        }"#;

        let recipe = Recipe::from_json(json).unwrap();
        assert_eq!(recipe.id(), "r-1");
        assert_eq!(recipe.component_kind().known(), Some(UIComponentKind::Form));
        assert_eq!(recipe.title(), Some("Receipt"));

        let amount = recipe.field("amount").unwrap();
        assert_eq!(amount.validation.as_ref().unwrap().min_length, Some(-1));

        let category = recipe.field("category").unwrap();
        assert_eq!(category.options.as_ref().unwrap().len(), 2);

        let mood = recipe.field("mood").unwrap();
        assert_eq!(mood.field_type, Vocab::Unknown("vibe".to_string()));
    }

    #[test]
    fn test_parse_accepts_legacy_component_type_key() {
        let json = r#"{"id": "r-2", "component_type": "auth_google"}"#;
        let recipe = Recipe::from_json(json).unwrap();
        assert_eq!(recipe.component_kind().known(), Some(UIComponentKind::AuthGoogle));
        assert!(recipe.schema().is_empty());
        assert!(!recipe.is_submitted());
    }

    #[test]
    fn test_parse_malformed_payload() {
        let err = Recipe::from_json("{not json").unwrap_err();
        assert!(matches!(err, RecipeError::Parse(_)));
    }

    #[test]
    fn test_submission_shapes() {
        let mut data = SubmissionData::new();
        data.insert("amount".to_string(), "12.50".to_string());

        let json = serde_json::to_value(Submission::data("r-1", data)).unwrap();
        assert_eq!(json, serde_json::json!({"recipe_id": "r-1", "data": {"amount": "12.50"}}));

        let json = serde_json::to_value(Submission::action("r-1", "confirm")).unwrap();
        assert_eq!(json, serde_json::json!({"recipe_id": "r-1", "action": "confirm"}));
    }

    #[test]
    fn test_data_submission_always_carries_data() {
        let json = serde_json::to_value(Submission::data("r-1", SubmissionData::new())).unwrap();
        assert_eq!(json, serde_json::json!({"recipe_id": "r-1", "data": {}}));

        let json = serde_json::to_value(
            Submission::data("r-1", SubmissionData::new()).with_withheld(vec!["api_key".to_string()]),
        )
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"recipe_id": "r-1", "data": {}, "withheld": ["api_key"]})
        );
    }

    #[test]
    fn test_submission_parses_either_shape() {
        let parsed: Submission =
            serde_json::from_str(r#"{"recipe_id": "r-1", "action": "skip"}"#).unwrap();
        assert_eq!(parsed, Submission::action("r-1", "skip"));

        let parsed: Submission = serde_json::from_str(r#"{"recipe_id": "r-1", "data": {}}"#).unwrap();
        assert_eq!(parsed, Submission::data("r-1", SubmissionData::new()));
    }

    #[test]
    fn test_parse_rejects_submitted_without_data() {
        let json = r#"{"id": "r-3", "component_kind": "form", "is_submitted": true}"#;
        let err = Recipe::from_json(json).unwrap_err();
        assert!(matches!(&err, RecipeError::Parse(msg) if msg.contains("no submitted_data")));
    }

    #[test]
    fn test_parse_rejects_draft_with_data() {
        let json = r#"{
            "id": "r-4",
            "component_kind": "form",
            "is_submitted": false,
            "submitted_data": {"a": "old"}
        }"#;
        let err = Recipe::from_json(json).unwrap_err();
        assert!(matches!(&err, RecipeError::Parse(msg) if msg.contains("not submitted")));

        let json = r#"{
            "id": "r-5",
            "component_kind": "form",
            "submitted_at": "2024-05-01T10:00:00Z"
        }"#;
        assert!(Recipe::from_json(json).is_err());
    }

    #[test]
    fn test_parse_submitted_recipe() {
        let json = r#"{
            "id": "r-6",
            "component_kind": "form",
            "schema": {"amount": {"type": "number"}},
            "is_submitted": true,
            "submitted_data": {"amount": "3"}
        }"#;
        let mut recipe = Recipe::from_json(json).unwrap();
        assert_eq!(recipe.state(), SubmissionState::Submitted);
        assert!(recipe.accept_submission(&SubmissionData::new()).is_err());
    }

    #[test]
    fn test_serialized_recipe_never_carries_secrets() {
        let mut recipe = Recipe::new(UIComponentKind::Form)
            .with_field("user", SchemaField::new(FieldType::Text).with_placeholder("jane"))
            .with_field("token", SchemaField::new(FieldType::Text).secret())
            .for_task("task-42");
        let mut data = SubmissionData::new();
        data.insert("user".to_string(), "jane".to_string());
        data.insert("token".to_string(), "sk-live-123".to_string());
        recipe.accept_submission(&data).unwrap();

        let json = recipe.to_json().unwrap();
        assert!(!json.contains("sk-live-123"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["submitted_data"],
            serde_json::json!({"user": "jane", "token": "[REDACTED]"})
        );
        assert_eq!(value["task_id"], "task-42");
        assert_eq!(value["schema"]["user"]["placeholder"], "jane");

        // The in-memory copy keeps the value
        assert_eq!(recipe.submitted_data(), Some(&data));
    }

    #[test]
    fn test_credential_kinds_redact_every_field() {
        let mut recipe = Recipe::new(UIComponentKind::ApiKeyInput)
            .with_field("api_key", SchemaField::new(FieldType::Text));
        let mut data = SubmissionData::new();
        data.insert("api_key".to_string(), "sk-live-123".to_string());
        recipe.accept_submission(&data).unwrap();

        assert!(recipe.is_secret_field("api_key"));
        assert!(!recipe.to_json().unwrap().contains("sk-live-123"));
    }

    #[test]
    fn test_wire_round_trip_of_draft() {
        let recipe = receipt_form().with_title("Receipt").for_task("task-1");
        let parsed = Recipe::from_json(&recipe.to_json().unwrap()).unwrap();
        assert_eq!(parsed, recipe);
        assert_eq!(parsed.task_id(), Some("task-1"));
    }
}
