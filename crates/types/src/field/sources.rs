//! Producer-specific descriptor shapes.
//!
//! Integration configuration schemas describe inputs with `id`/`label`/`type`
//! and a nested `validation` block. MCP catalog entries describe server
//! parameters with `name`/`displayName`/`kind` and flat constraint keys. Both
//! deserialize into [`FieldDescriptor`], which is normalized exactly once.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{FieldAccessors, FormField};
use crate::{FieldOption, FieldType, FieldValidation};

/// Field declared by an integration's configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationField {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub r#type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub validation: Option<FieldValidation>,
}

/// Choice attached to an MCP server parameter; either a bare literal or a
/// labelled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McpParameterChoice {
    Labeled {
        value: Value,
        #[serde(default)]
        label: Option<String>,
    },
    Literal(Value),
}

impl McpParameterChoice {
    fn to_option(&self) -> FieldOption {
        match self {
            Self::Labeled { value, label: Some(label) } => FieldOption::new(value.clone(), label.clone()),
            Self::Labeled { value, label: None } | Self::Literal(value) => FieldOption::new(value.clone(), literal_label(value)),
        }
    }
}

fn literal_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parameter declared by an MCP server catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerParameter {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub choices: Vec<McpParameterChoice>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub pattern_message: Option<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    /// Marks credentials; implies `password` when `kind` is absent.
    #[serde(default)]
    pub secret: bool,
}

/// Either supported descriptor shape.
///
/// The shape is chosen by key: an `id` marks an integration field, a `name`
/// an MCP server parameter. Errors are reported against the chosen shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldDescriptor {
    Integration(IntegrationField),
    McpParameter(McpServerParameter),
}

impl<'de> Deserialize<'de> for FieldDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let Some(object) = raw.as_object() else {
            return Err(serde::de::Error::custom("field descriptor must be a mapping"));
        };
        if object.contains_key("id") {
            IntegrationField::deserialize(raw)
                .map(Self::Integration)
                .map_err(|error| serde::de::Error::custom(format!("invalid integration field: {}", error)))
        } else if object.contains_key("name") {
            McpServerParameter::deserialize(raw)
                .map(Self::McpParameter)
                .map_err(|error| serde::de::Error::custom(format!("invalid MCP server parameter: {}", error)))
        } else {
            Err(serde::de::Error::custom("field descriptor needs an 'id' or a 'name'"))
        }
    }
}

impl FieldDescriptor {
    /// Resolves the descriptor into the canonical shape.
    pub fn normalize(&self) -> FormField {
        FormField::from_accessors(self)
    }
}

impl From<IntegrationField> for FieldDescriptor {
    fn from(value: IntegrationField) -> Self {
        Self::Integration(value)
    }
}

impl From<McpServerParameter> for FieldDescriptor {
    fn from(value: McpServerParameter) -> Self {
        Self::McpParameter(value)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

impl FieldAccessors for IntegrationField {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        non_blank(self.label.as_deref()).unwrap_or(self.id.as_str())
    }
    fn field_type(&self) -> FieldType {
        self.r#type.clone().map(FieldType::from).unwrap_or_default()
    }
    fn required(&self) -> bool {
        self.required
    }
    fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
    fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }
    fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref().filter(|value| !value.is_null())
    }
    fn options(&self) -> Vec<FieldOption> {
        self.options.clone()
    }
    fn validation(&self) -> Option<FieldValidation> {
        self.validation.clone()
    }
}

impl FieldAccessors for McpServerParameter {
    fn id(&self) -> &str {
        &self.name
    }
    fn label(&self) -> &str {
        non_blank(self.display_name.as_deref()).unwrap_or(self.name.as_str())
    }
    fn field_type(&self) -> FieldType {
        match &self.kind {
            Some(kind) => FieldType::from(kind.clone()),
            None if self.secret => FieldType::Password,
            None if !self.choices.is_empty() => FieldType::Select,
            None => FieldType::Text,
        }
    }
    fn required(&self) -> bool {
        self.is_required.unwrap_or(false)
    }
    fn description(&self) -> &str {
        self.help.as_deref().unwrap_or_default()
    }
    fn placeholder(&self) -> Option<&str> {
        self.hint.as_deref()
    }
    fn default_value(&self) -> Option<&Value> {
        self.default.as_ref().filter(|value| !value.is_null())
    }
    fn options(&self) -> Vec<FieldOption> {
        self.choices.iter().map(McpParameterChoice::to_option).collect()
    }
    fn validation(&self) -> Option<FieldValidation> {
        let validation = FieldValidation {
            pattern: self.pattern.clone(),
            message: self.pattern_message.clone(),
            min: self.minimum,
            max: self.maximum,
        };
        (!validation.is_empty()).then_some(validation)
    }
}

impl FieldAccessors for FieldDescriptor {
    fn id(&self) -> &str {
        match self {
            Self::Integration(field) => field.id(),
            Self::McpParameter(parameter) => parameter.id(),
        }
    }
    fn label(&self) -> &str {
        match self {
            Self::Integration(field) => field.label(),
            Self::McpParameter(parameter) => parameter.label(),
        }
    }
    fn field_type(&self) -> FieldType {
        match self {
            Self::Integration(field) => field.field_type(),
            Self::McpParameter(parameter) => parameter.field_type(),
        }
    }
    fn required(&self) -> bool {
        match self {
            Self::Integration(field) => field.required(),
            Self::McpParameter(parameter) => parameter.required(),
        }
    }
    fn description(&self) -> &str {
        match self {
            Self::Integration(field) => field.description(),
            Self::McpParameter(parameter) => parameter.description(),
        }
    }
    fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Integration(field) => field.placeholder(),
            Self::McpParameter(parameter) => parameter.placeholder(),
        }
    }
    fn default_value(&self) -> Option<&Value> {
        match self {
            Self::Integration(field) => field.default_value(),
            Self::McpParameter(parameter) => parameter.default_value(),
        }
    }
    fn options(&self) -> Vec<FieldOption> {
        match self {
            Self::Integration(field) => field.options(),
            Self::McpParameter(parameter) => parameter.options(),
        }
    }
    fn validation(&self) -> Option<FieldValidation> {
        match self {
            Self::Integration(field) => field.validation(),
            Self::McpParameter(parameter) => parameter.validation(),
        }
    }
}
