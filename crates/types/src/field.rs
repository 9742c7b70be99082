//! Canonical field shape and the accessor capability used to reach it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldOption, FieldType, FieldValidation};

pub mod sources;

/// Read-only view over a field descriptor, independent of its source shape.
///
/// Each producer shape implements this trait and resolves its own property
/// names; missing properties resolve to `required = false`, an empty
/// description and the `text` type.
pub trait FieldAccessors {
    fn id(&self) -> &str;
    fn label(&self) -> &str;
    fn field_type(&self) -> FieldType;
    fn required(&self) -> bool;
    fn description(&self) -> &str;
    fn placeholder(&self) -> Option<&str>;
    fn default_value(&self) -> Option<&Value>;
    fn options(&self) -> Vec<FieldOption>;
    fn validation(&self) -> Option<FieldValidation>;
}

/// Normalized field descriptor consumed by the form engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub description: String,
    pub placeholder: Option<String>,
    pub default_value: Option<Value>,
    pub options: Vec<FieldOption>,
    pub validation: Option<FieldValidation>,
}

impl FormField {
    /// Creates an optional field whose label is its id.
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            field_type,
            required: false,
            description: String::new(),
            placeholder: None,
            default_value: None,
            options: Vec::new(),
            validation: None,
        }
    }

    /// Copies every accessor of `source` into an owned canonical field.
    pub fn from_accessors<A: FieldAccessors + ?Sized>(source: &A) -> Self {
        Self {
            id: source.id().to_string(),
            label: source.label().to_string(),
            field_type: source.field_type(),
            required: source.required(),
            description: source.description().to_string(),
            placeholder: source.placeholder().map(str::to_string),
            default_value: source.default_value().cloned(),
            options: source.options(),
            validation: source.validation(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn mark_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}

impl FieldAccessors for FormField {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn field_type(&self) -> FieldType {
        self.field_type.clone()
    }
    fn required(&self) -> bool {
        self.required
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }
    fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }
    fn options(&self) -> Vec<FieldOption> {
        self.options.clone()
    }
    fn validation(&self) -> Option<FieldValidation> {
        self.validation.clone()
    }
}
