//! Action dispatch
//!
//! Maps a component kind to the semantic verb returned to the orchestrator
//! when an interaction concludes.

use recipe_core::{UIComponentKind, Vocab};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic outcome of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Submit,
    Confirm,
    Approve,
    Auth,
    Execute,
    /// Deferable input explicitly skipped without data
    Skip,
    /// Dismissed without consequence
    Cancel,
}

impl ActionVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionVerb::Submit => "submit",
            ActionVerb::Confirm => "confirm",
            ActionVerb::Approve => "approve",
            ActionVerb::Auth => "auth",
            ActionVerb::Execute => "execute",
            ActionVerb::Skip => "skip",
            ActionVerb::Cancel => "cancel",
        }
    }

    /// Whether the verb goes out with a data map rather than an action name
    pub fn carries_data(&self) -> bool {
        matches!(self, ActionVerb::Submit)
    }
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb requested on a successful interaction with `kind`
pub fn resolve_action(kind: UIComponentKind) -> ActionVerb {
    use UIComponentKind::*;

    match kind {
        Confirmation => ActionVerb::Confirm,
        Approval => ActionVerb::Approve,
        AuthGoogle | AuthApple | AuthOAuth => ActionVerb::Auth,
        Execute => ActionVerb::Execute,
        Form | Picker | MultiSelect | DatePicker | ContactPicker | FileUpload | LocationPicker
        | OptionButtons | OptionCards | QuickReplies | InfoChips => ActionVerb::Submit,
        InfoCard | Weather | Summary | ListView | Progress | StyledList | ActionCards
        | StatusStrip => ActionVerb::Submit,
        ApiKeyInput | CredentialsInput | ServiceConnect | AuthCallback => ActionVerb::Submit,
        EmailPreview | EmailCompose | CalendarEvent | MessagePreview | DocumentPreview
        | LinkPreview => ActionVerb::Submit,
    }
}

/// Like [`resolve_action`]; unrecognized kinds resolve to `Submit`
pub fn resolve_action_for(kind: &Vocab<UIComponentKind>) -> ActionVerb {
    kind.known().map(resolve_action).unwrap_or(ActionVerb::Submit)
}

/// Input kinds the operator may skip without providing data
pub fn deferable(kind: UIComponentKind) -> bool {
    matches!(
        kind,
        UIComponentKind::Form
            | UIComponentKind::Picker
            | UIComponentKind::MultiSelect
            | UIComponentKind::DatePicker
            | UIComponentKind::FileUpload
            | UIComponentKind::LocationPicker
            | UIComponentKind::ContactPicker
    )
}
