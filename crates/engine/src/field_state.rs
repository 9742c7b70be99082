//! Per-field state owned by a form instance.
//!
//! Each [`FieldState`] carries the normalized field, its compiled pattern, the
//! control-specific editing state (a [`TextBuffer`] for text-like fields, the
//! selected option for dropdowns) and the current semantic value.

use formkit_types::{FieldOption, FieldType, FormField};
use serde_json::{Number, Value};
use tracing::warn;

use crate::text_buffer::TextBuffer;
use crate::validation::{CompiledPattern, stringify_value, validate_field};

/// Control-specific editing state.
#[derive(Debug, Clone)]
pub enum FieldInput {
    /// Live edit buffer for text, email, url, number, path, directory, file and password fields.
    Text(TextBuffer),
    /// Checkbox state; `None` until a value is known.
    Toggle(Option<bool>),
    /// Index into the field's options; `None` while nothing is selected.
    Choice(Option<usize>),
    /// Unsupported field types hold no editing state.
    Inert,
}

#[derive(Debug, Clone)]
pub struct FieldState {
    field: FormField,
    pattern: CompiledPattern,
    input: FieldInput,
    value: Option<Value>,
    touched: bool,
}

impl FieldState {
    /// Builds the state for `field`, seeded from `initial` or the field's default.
    ///
    /// Checkbox and dropdown seeds must resolve to a boolean or one of the
    /// options; anything else leaves the field unset so the published value
    /// always matches what the control shows.
    pub fn new(field: FormField, initial: Option<&Value>) -> Self {
        let seed = initial
            .filter(|value| !value.is_null())
            .or(field.default_value.as_ref().filter(|value| !value.is_null()));
        let pattern = CompiledPattern::compile(&field.id, field.validation.as_ref());
        let (input, value) = match &field.field_type {
            field_type if field_type.is_text_backed() => (
                FieldInput::Text(TextBuffer::with_text(seed.map(stringify_value).unwrap_or_default())),
                seed.cloned(),
            ),
            FieldType::Boolean => {
                let checked = seed.and_then(boolean_value);
                (FieldInput::Toggle(checked), checked.map(Value::Bool))
            }
            FieldType::Select => {
                let selected = seed.and_then(|value| option_position(&field.options, value));
                let value = selected
                    .and_then(|index| field.options.get(index))
                    .map(|option| option.value.clone());
                (FieldInput::Choice(selected), value)
            }
            _ => (FieldInput::Inert, seed.cloned()),
        };
        if let Some(seed) = seed
            && value.is_none()
        {
            warn!(field = %field.id, value = %seed, "Dropping initial value the control cannot show");
        }

        Self {
            field,
            pattern,
            input,
            value,
            touched: false,
        }
    }

    pub fn field(&self) -> &FormField {
        &self.field
    }

    pub fn input(&self) -> &FieldInput {
        &self.input
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub fn buffer(&self) -> Option<&TextBuffer> {
        match &self.input {
            FieldInput::Text(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self.input {
            FieldInput::Choice(selected) => selected,
            _ => None,
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match self.input {
            FieldInput::Toggle(checked) => checked,
            _ => None,
        }
    }

    /// Replaces the value and keeps the editing state in step with it.
    ///
    /// Text buffers receive the stringified value; dropdowns select the
    /// matching option, if any. `Null` clears the field back to unset.
    pub fn set_value(&mut self, value: Value) {
        if value.is_null() {
            self.clear();
            return;
        }
        match &mut self.input {
            FieldInput::Text(buffer) => buffer.replace(stringify_value(&value)),
            FieldInput::Toggle(checked) => *checked = boolean_value(&value),
            FieldInput::Choice(selected) => *selected = option_position(&self.field.options, &value),
            FieldInput::Inert => {}
        }
        self.value = Some(value);
    }

    /// Returns the field to unset with empty editing state.
    pub fn clear(&mut self) {
        match &mut self.input {
            FieldInput::Text(buffer) => buffer.replace(""),
            FieldInput::Toggle(checked) => *checked = None,
            FieldInput::Choice(selected) => *selected = None,
            FieldInput::Inert => {}
        }
        self.value = None;
    }

    /// Applies `edit` to the text buffer and converts the result into the field's value.
    ///
    /// Returns `None` without calling `edit` when the field is not text-backed.
    pub fn edit_buffer<F: FnOnce(&mut TextBuffer)>(&mut self, edit: F) -> Option<()> {
        let FieldInput::Text(buffer) = &mut self.input else {
            return None;
        };
        edit(buffer);
        self.value = Some(convert_text(&self.field.field_type, buffer.text()));
        Some(())
    }

    /// Current validation message, or `None` when the value passes.
    pub fn validate(&self) -> Option<String> {
        validate_field(&self.field, &self.pattern, self.value.as_ref())
    }

    /// Releases the edit buffer.
    pub fn dispose(&mut self) {
        if let FieldInput::Text(buffer) = &mut self.input {
            buffer.release();
        }
    }
}

/// Converts buffer text into the field's semantic value.
///
/// Number fields store a JSON number when the text parses (integers stay
/// integral) and the raw text otherwise so validation can report it.
pub fn convert_text(field_type: &FieldType, text: &str) -> Value {
    if *field_type == FieldType::Number {
        let trimmed = text.trim();
        if let Ok(integer) = trimmed.parse::<i64>() {
            return Value::Number(integer.into());
        }
        if let Some(number) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

/// Finds the option matching `value`, comparing JSON values first and their
/// text rendering second.
pub fn option_position(options: &[FieldOption], value: &Value) -> Option<usize> {
    options
        .iter()
        .position(|option| &option.value == value)
        .or_else(|| {
            let rendered = stringify_value(value);
            options.iter().position(|option| stringify_value(&option.value) == rendered)
        })
}

fn boolean_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
