//! Field and component vocabulary
//!
//! Closed enumerations of the field types and component kinds a Recipe can
//! name, plus the four categories every component kind falls into. The sets
//! are fixed at compile time; adding a kind means adding a variant and
//! letting the exhaustive matches point at every place that must change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A closed vocabulary whose members have a stable wire name
pub trait Named: Copy + Sized + 'static {
    /// Vocabulary name used in error messages
    const VOCABULARY: &'static str;

    /// Every member, in declaration order
    fn all() -> &'static [Self];

    /// Canonical snake_case wire name
    fn name(&self) -> &'static str;

    /// camelCase spelling used by older agents (`datePicker`)
    fn camel_name(&self) -> String {
        snake_to_camel(self.name())
    }

    /// Look a member up by its exact snake_case or camelCase spelling
    fn from_name(raw: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|member| member.name() == raw || member.camel_name() == raw)
    }
}

fn snake_to_camel(snake: &str) -> String {
    let mut camel = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            camel.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            camel.push(c);
        }
    }
    camel
}

/// A name that is not part of a vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} '{raw}'")]
pub struct UnknownName {
    pub vocabulary: &'static str,
    pub raw: String,
}

macro_rules! impl_named {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Named>::from_name(s).ok_or_else(|| UnknownName {
                    vocabulary: <$ty as Named>::VOCABULARY,
                    raw: s.to_string(),
                })
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    // Basic input
    Text,
    Number,
    Date,
    Datetime,
    Time,
    Email,
    Phone,
    Url,

    // Selection
    Select,
    MultiSelect,
    Boolean,

    // Files
    File,
    Image,
    Document,

    // Rich content
    Location,
    Contact,
    Currency,

    // Display only
    RichText,
    Html,
    Markdown,
    Json,
}

impl FieldType {
    pub const ALL: [FieldType; 21] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Time,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Select,
        FieldType::MultiSelect,
        FieldType::Boolean,
        FieldType::File,
        FieldType::Image,
        FieldType::Document,
        FieldType::Location,
        FieldType::Contact,
        FieldType::Currency,
        FieldType::RichText,
        FieldType::Html,
        FieldType::Markdown,
        FieldType::Json,
    ];

    /// Whether values of this type are parsed as numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Currency)
    }
}

impl Named for FieldType {
    const VOCABULARY: &'static str = "field type";

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Boolean => "boolean",
            FieldType::File => "file",
            FieldType::Image => "image",
            FieldType::Document => "document",
            FieldType::Location => "location",
            FieldType::Contact => "contact",
            FieldType::Currency => "currency",
            FieldType::RichText => "rich_text",
            FieldType::Html => "html",
            FieldType::Markdown => "markdown",
            FieldType::Json => "json",
        }
    }
}

impl_named!(FieldType);

/// Coarse grouping of component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// Collects structured data from the operator
    Input,
    /// Shows information, read-only
    Display,
    /// Gates or triggers an action (confirm, approve, auth, execute)
    Action,
    /// Previews rich content (emails, calendar, documents)
    Rich,
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComponentCategory::Input => write!(f, "input"),
            ComponentCategory::Display => write!(f, "display"),
            ComponentCategory::Action => write!(f, "action"),
            ComponentCategory::Rich => write!(f, "rich"),
        }
    }
}

/// Interaction widget a Recipe requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UIComponentKind {
    // === Input ===
    Form,
    Picker,
    MultiSelect,
    DatePicker,
    ContactPicker,
    FileUpload,
    LocationPicker,
    OptionButtons,
    OptionCards,
    QuickReplies,
    InfoChips,

    // === Display ===
    InfoCard,
    Weather,
    Summary,
    ListView,
    Progress,
    StyledList,
    ActionCards,
    StatusStrip,

    // === Action ===
    Confirmation,
    Approval,
    AuthGoogle,
    AuthApple,
    AuthOAuth,
    Execute,
    ApiKeyInput,
    CredentialsInput,
    ServiceConnect,
    AuthCallback,

    // === Rich ===
    EmailPreview,
    EmailCompose,
    CalendarEvent,
    MessagePreview,
    DocumentPreview,
    LinkPreview,
}

impl UIComponentKind {
    pub const ALL: [UIComponentKind; 35] = [
        UIComponentKind::Form,
        UIComponentKind::Picker,
        UIComponentKind::MultiSelect,
        UIComponentKind::DatePicker,
        UIComponentKind::ContactPicker,
        UIComponentKind::FileUpload,
        UIComponentKind::LocationPicker,
        UIComponentKind::OptionButtons,
        UIComponentKind::OptionCards,
        UIComponentKind::QuickReplies,
        UIComponentKind::InfoChips,
        UIComponentKind::InfoCard,
        UIComponentKind::Weather,
        UIComponentKind::Summary,
        UIComponentKind::ListView,
        UIComponentKind::Progress,
        UIComponentKind::StyledList,
        UIComponentKind::ActionCards,
        UIComponentKind::StatusStrip,
        UIComponentKind::Confirmation,
        UIComponentKind::Approval,
        UIComponentKind::AuthGoogle,
        UIComponentKind::AuthApple,
        UIComponentKind::AuthOAuth,
        UIComponentKind::Execute,
        UIComponentKind::ApiKeyInput,
        UIComponentKind::CredentialsInput,
        UIComponentKind::ServiceConnect,
        UIComponentKind::AuthCallback,
        UIComponentKind::EmailPreview,
        UIComponentKind::EmailCompose,
        UIComponentKind::CalendarEvent,
        UIComponentKind::MessagePreview,
        UIComponentKind::DocumentPreview,
        UIComponentKind::LinkPreview,
    ];

    /// The category this kind belongs to
    pub fn category(&self) -> ComponentCategory {
        use UIComponentKind::*;

        match self {
            Form | Picker | MultiSelect | DatePicker | ContactPicker | FileUpload
            | LocationPicker | OptionButtons | OptionCards | QuickReplies | InfoChips => {
                ComponentCategory::Input
            }
            InfoCard | Weather | Summary | ListView | Progress | StyledList | ActionCards
            | StatusStrip => ComponentCategory::Display,
            Confirmation | Approval | AuthGoogle | AuthApple | AuthOAuth | Execute
            | ApiKeyInput | CredentialsInput | ServiceConnect | AuthCallback => {
                ComponentCategory::Action
            }
            EmailPreview | EmailCompose | CalendarEvent | MessagePreview | DocumentPreview
            | LinkPreview => ComponentCategory::Rich,
        }
    }

    pub fn is_input(&self) -> bool {
        self.category() == ComponentCategory::Input
    }

    /// Kinds whose every field carries a secret (API keys, passwords)
    pub fn collects_secrets(&self) -> bool {
        matches!(self, UIComponentKind::ApiKeyInput | UIComponentKind::CredentialsInput)
    }
}

impl Named for UIComponentKind {
    const VOCABULARY: &'static str = "component kind";

    fn camel_name(&self) -> String {
        match self {
            UIComponentKind::AuthOAuth => "authOAuth".to_string(),
            other => snake_to_camel(other.name()),
        }
    }

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn name(&self) -> &'static str {
        match self {
            UIComponentKind::Form => "form",
            UIComponentKind::Picker => "picker",
            UIComponentKind::MultiSelect => "multi_select",
            UIComponentKind::DatePicker => "date_picker",
            UIComponentKind::ContactPicker => "contact_picker",
            UIComponentKind::FileUpload => "file_upload",
            UIComponentKind::LocationPicker => "location_picker",
            UIComponentKind::OptionButtons => "option_buttons",
            UIComponentKind::OptionCards => "option_cards",
            UIComponentKind::QuickReplies => "quick_replies",
            UIComponentKind::InfoChips => "info_chips",
            UIComponentKind::InfoCard => "info_card",
            UIComponentKind::Weather => "weather",
            UIComponentKind::Summary => "summary",
            UIComponentKind::ListView => "list_view",
            UIComponentKind::Progress => "progress",
            UIComponentKind::StyledList => "styled_list",
            UIComponentKind::ActionCards => "action_cards",
            UIComponentKind::StatusStrip => "status_strip",
            UIComponentKind::Confirmation => "confirmation",
            UIComponentKind::Approval => "approval",
            UIComponentKind::AuthGoogle => "auth_google",
            UIComponentKind::AuthApple => "auth_apple",
            UIComponentKind::AuthOAuth => "auth_oauth",
            UIComponentKind::Execute => "execute",
            UIComponentKind::ApiKeyInput => "api_key_input",
            UIComponentKind::CredentialsInput => "credentials_input",
            UIComponentKind::ServiceConnect => "service_connect",
            UIComponentKind::AuthCallback => "auth_callback",
            UIComponentKind::EmailPreview => "email_preview",
            UIComponentKind::EmailCompose => "email_compose",
            UIComponentKind::CalendarEvent => "calendar_event",
            UIComponentKind::MessagePreview => "message_preview",
            UIComponentKind::DocumentPreview => "document_preview",
            UIComponentKind::LinkPreview => "link_preview",
        }
    }
}

impl_named!(UIComponentKind);

/// A vocabulary value as received on the wire.
///
/// Agent output may name anything; an unrecognized name is kept verbatim so
/// the structural validator can report it instead of the payload failing to
/// parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Vocab<T> {
    Known(T),
    Unknown(String),
}

impl<T: Named> Vocab<T> {
    /// Classify a raw wire name
    pub fn parse(raw: &str) -> Self {
        match T::from_name(raw) {
            Some(member) => Vocab::Known(member),
            None => Vocab::Unknown(raw.to_string()),
        }
    }

    /// The recognized member, if any
    pub fn known(&self) -> Option<T> {
        match self {
            Vocab::Known(member) => Some(*member),
            Vocab::Unknown(_) => None,
        }
    }

    /// The wire spelling
    pub fn raw(&self) -> &str {
        match self {
            Vocab::Known(member) => member.name(),
            Vocab::Unknown(raw) => raw,
        }
    }
}

impl<T> From<T> for Vocab<T> {
    fn from(member: T) -> Self {
        Vocab::Known(member)
    }
}

impl<T: Named> fmt::Display for Vocab<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl<T: Named> Serialize for Vocab<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.raw())
    }
}

impl<'de, T: Named> Deserialize<'de> for Vocab<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Vocab::parse(&raw))
    }
}
