//! Strongly typed field descriptor definitions shared by the form engine and CLI.
//!
//! Integration settings screens receive field lists from two different
//! producers: integration configuration schemas and MCP server catalog
//! entries. Both shapes live in [`field::sources`] and are normalized once into
//! the canonical [`FormField`] so nothing downstream ever inspects the raw
//! descriptor.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod field;

pub use field::sources::{FieldDescriptor, IntegrationField, McpParameterChoice, McpServerParameter};
pub use field::{FieldAccessors, FormField};

/// Current value per field id, in field declaration order.
pub type FormValues = IndexMap<String, Value>;

/// Semantic type of a form field.
///
/// Unknown type names are preserved in [`FieldType::Unsupported`] so the UI
/// can render a notice naming the offending type instead of guessing a control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Url,
    Number,
    Path,
    Directory,
    File,
    Password,
    Boolean,
    Select,
    Unsupported(String),
}

impl FieldType {
    /// Canonical lowercase name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number => "number",
            Self::Path => "path",
            Self::Directory => "directory",
            Self::File => "file",
            Self::Password => "password",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Unsupported(raw) => raw,
        }
    }

    /// Returns true when the field is edited through a live text buffer.
    pub fn is_text_backed(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Email | Self::Url | Self::Number | Self::Path | Self::Directory | Self::File | Self::Password
        )
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "" | "text" | "string" => Self::Text,
            "email" => Self::Email,
            "url" => Self::Url,
            "number" => Self::Number,
            "path" => Self::Path,
            "directory" => Self::Directory,
            "file" => Self::File,
            "password" => Self::Password,
            "boolean" => Self::Boolean,
            "select" => Self::Select,
            _ => Self::Unsupported(s.trim().to_string()),
        })
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        let Ok(parsed) = value.parse::<FieldType>();
        parsed
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable entry of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Value stored in the form when this option is chosen.
    pub value: Value,
    /// Text shown in the dropdown.
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative constraints applied after the required and type checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Regular expression the stringified value must match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Message reported when `pattern` does not match.
    #[serde(default)]
    pub message: Option<String>,
    /// Inclusive lower bound for `number` fields.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for `number` fields.
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.min.is_none() && self.max.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!("EMAIL".parse::<FieldType>().unwrap(), FieldType::Email);
        assert_eq!(" url ".parse::<FieldType>().unwrap(), FieldType::Url);
        assert_eq!("".parse::<FieldType>().unwrap(), FieldType::Text);
    }

    #[test]
    fn keeps_unknown_type_name() {
        let parsed: FieldType = "color".parse().unwrap();
        assert_eq!(parsed, FieldType::Unsupported("color".to_string()));
        assert!(!parsed.is_supported());
        assert_eq!(parsed.to_string(), "color");
    }

    #[test]
    fn text_backed_types() {
        assert!(FieldType::Password.is_text_backed());
        assert!(FieldType::Directory.is_text_backed());
        assert!(!FieldType::Boolean.is_text_backed());
        assert!(!FieldType::Select.is_text_backed());
        assert!(!FieldType::Unsupported("x".into()).is_text_backed());
    }

    #[test]
    fn field_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&FieldType::Number).unwrap();
        assert_eq!(json, "\"number\"");
        let back: FieldType = serde_json::from_str("\"select\"").unwrap();
        assert_eq!(back, FieldType::Select);
    }
}
