//! Whitelist configuration
//!
//! The closed set of component kinds and field types an engine accepts.
//! Anything outside it is rejected before display, even when it is a valid
//! member of the vocabulary.

use recipe_core::{FieldType, Named, UIComponentKind, Vocab};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Default title limit, in characters
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 100;

fn default_max_title_length() -> Option<usize> {
    Some(DEFAULT_MAX_TITLE_LENGTH)
}

/// Errors loading a whitelist
#[derive(Debug, Error)]
pub enum WhitelistError {
    #[error("failed to read whitelist {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid whitelist: {0}")]
    Parse(String),
}

/// Accepted component kinds and field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    /// Whitelist name (e.g. "full@1.0")
    pub name: String,

    pub allowed_kinds: BTreeSet<UIComponentKind>,

    pub allowed_field_types: BTreeSet<FieldType>,

    /// Maximum title length in characters; `None` disables the check
    #[serde(default = "default_max_title_length")]
    pub max_title_length: Option<usize>,
}

impl Whitelist {
    /// Every component kind and field type
    pub fn full() -> Self {
        Self {
            name: "full@1.0".to_string(),
            allowed_kinds: UIComponentKind::ALL.iter().copied().collect(),
            allowed_field_types: FieldType::ALL.iter().copied().collect(),
            max_title_length: default_max_title_length(),
        }
    }

    /// The component kinds shipped by the first server release
    pub fn legacy() -> Self {
        use UIComponentKind::*;

        let kinds = [
            Form,
            Picker,
            MultiSelect,
            DatePicker,
            ContactPicker,
            FileUpload,
            LocationPicker,
            InfoCard,
            Weather,
            Summary,
            ListView,
            Progress,
            Confirmation,
            Approval,
            AuthGoogle,
            AuthApple,
            AuthOAuth,
            Execute,
            EmailPreview,
            EmailCompose,
            CalendarEvent,
            MessagePreview,
            DocumentPreview,
            LinkPreview,
        ];

        Self {
            name: "legacy@1.0".to_string(),
            allowed_kinds: kinds.into_iter().collect(),
            allowed_field_types: FieldType::ALL.iter().copied().collect(),
            max_title_length: default_max_title_length(),
        }
    }

    pub fn allow_kind(mut self, kind: UIComponentKind) -> Self {
        self.allowed_kinds.insert(kind);
        self
    }

    pub fn deny_kind(mut self, kind: UIComponentKind) -> Self {
        self.allowed_kinds.remove(&kind);
        self
    }

    pub fn deny_field_type(mut self, field_type: FieldType) -> Self {
        self.allowed_field_types.remove(&field_type);
        self
    }

    pub fn with_max_title_length(mut self, max: Option<usize>) -> Self {
        self.max_title_length = max;
        self
    }

    /// Unknown names are never allowed
    pub fn allows_kind(&self, kind: &Vocab<UIComponentKind>) -> bool {
        kind.known()
            .map(|k| self.allowed_kinds.contains(&k))
            .unwrap_or(false)
    }

    pub fn allows_field_type(&self, field_type: &Vocab<FieldType>) -> bool {
        field_type
            .known()
            .map(|t| self.allowed_field_types.contains(&t))
            .unwrap_or(false)
    }

    /// Hint listing accepted field types, used in `invalid_field_type` errors
    pub fn expected_field_types(&self) -> String {
        let names: Vec<&str> = self.allowed_field_types.iter().map(|t| t.name()).collect();
        format!("one of: {}", names.join(", "))
    }

    /// Load a whitelist from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, WhitelistError> {
        serde_yaml::from_str(yaml).map_err(|e| WhitelistError::Parse(e.to_string()))
    }

    /// Load a whitelist from JSON
    pub fn from_json(json: &str) -> Result<Self, WhitelistError> {
        serde_json::from_str(json).map_err(|e| WhitelistError::Parse(e.to_string()))
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WhitelistError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| WhitelistError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let whitelist = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_yaml(&content)?,
        };

        tracing::debug!(
            name = %whitelist.name,
            kinds = whitelist.allowed_kinds.len(),
            field_types = whitelist.allowed_field_types.len(),
            "loaded whitelist"
        );
        Ok(whitelist)
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::full()
    }
}
