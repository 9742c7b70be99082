//! Field type to control dispatch.
//!
//! The engine does not draw anything. It describes, per field, which control a
//! front end should render and what that control shows, so every front end
//! dispatches on the same table:
//!
//! | type | control |
//! |---|---|
//! | boolean | checkbox |
//! | select | dropdown bound to the field's options |
//! | password | obscured entry with a trailing key glyph |
//! | text, email, url, number, path, directory, file | single-line entry with an input mode hint |
//! | anything else | "unsupported field type" notice |

use formkit_types::{FieldOption, FieldType};
use serde::Serialize;

use crate::field_state::FieldState;

/// Glyph rendered after secret entries.
pub const KEY_GLYPH: char = '🔑';

/// Character used to obscure secret entry text.
pub const MASK_CHAR: char = '•';

/// Keyboard / input-mode hint for single-line entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Default,
    Email,
    Numeric,
    Url,
}

impl InputMode {
    pub fn for_type(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Email => Self::Email,
            FieldType::Number => Self::Numeric,
            FieldType::Url => Self::Url,
            _ => Self::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Checkbox { checked: bool },
    Dropdown { options: Vec<FieldOption>, selected: Option<usize> },
    SecretEntry { trailing_glyph: char },
    TextEntry { input_mode: InputMode },
    UnsupportedNotice { field_type: String },
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Checkbox { .. } => "checkbox",
            Self::Dropdown { .. } => "dropdown",
            Self::SecretEntry { .. } => "secret",
            Self::TextEntry { .. } => "text",
            Self::UnsupportedNotice { .. } => "unsupported",
        }
    }

    /// Text and dropdown controls show an error line under the control.
    pub fn shows_error_line(&self) -> bool {
        matches!(self, Self::Dropdown { .. } | Self::SecretEntry { .. } | Self::TextEntry { .. })
    }
}

/// Everything a front end needs to render one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSpec {
    pub field_id: String,
    pub label: String,
    /// Render a required marker next to the label.
    pub required_marker: bool,
    /// Description line under the label; `None` when the field has no description.
    pub description: Option<String>,
    pub placeholder: Option<String>,
    /// Text shown inside entry controls; obscured for secrets.
    pub display_text: String,
    /// Error line under the control.
    pub error: Option<String>,
    pub editable: bool,
    pub kind: ControlKind,
}

impl ControlSpec {
    pub fn build(state: &FieldState, error: Option<&str>, form_enabled: bool) -> Self {
        let field = state.field();
        let kind = match &field.field_type {
            FieldType::Boolean => ControlKind::Checkbox {
                checked: state.checked().unwrap_or(false),
            },
            FieldType::Select => ControlKind::Dropdown {
                options: field.options.clone(),
                selected: state.selected_index(),
            },
            FieldType::Password => ControlKind::SecretEntry { trailing_glyph: KEY_GLYPH },
            FieldType::Unsupported(raw) => ControlKind::UnsupportedNotice { field_type: raw.clone() },
            other => ControlKind::TextEntry {
                input_mode: InputMode::for_type(other),
            },
        };

        let raw_text = state.buffer().map(|buffer| buffer.text()).unwrap_or_default();
        let display_text = match kind {
            ControlKind::SecretEntry { .. } => raw_text.chars().map(|_| MASK_CHAR).collect::<String>(),
            _ => raw_text.to_string(),
        };

        Self {
            field_id: field.id.clone(),
            label: field.label.clone(),
            required_marker: field.required,
            description: (!field.description.trim().is_empty()).then(|| field.description.clone()),
            placeholder: field.placeholder.clone(),
            display_text,
            error: error.filter(|_| kind.shows_error_line()).map(str::to_string),
            editable: form_enabled && field.field_type.is_supported(),
            kind,
        }
    }
}
