//! Per-field validation rules.
//!
//! Checks run in a fixed order and the first failure wins:
//! - required: missing, null, or whitespace-only values.
//! - type: email, URL (http/https only), and number shape.
//! - pattern: the declared regular expression.
//! - range: inclusive `min`/`max` bounds for number fields.
//!
//! Failures are plain messages keyed by field; nothing here returns an error
//! to the caller.

use formkit_types::{FieldType, FieldValidation, FormField};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;
use url::Url;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile"));

/// A field's `validation.pattern`, compiled once when the form state is built.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Absent,
    Valid(Regex),
    Malformed { pattern: String, reason: String },
}

impl CompiledPattern {
    pub fn compile(field_id: &str, validation: Option<&FieldValidation>) -> Self {
        let Some(pattern) = validation.and_then(|rules| rules.pattern.as_deref()) else {
            return Self::Absent;
        };
        match Regex::new(pattern) {
            Ok(regex) => Self::Valid(regex),
            Err(error) => {
                warn!(field = field_id, pattern, error = %error, "Field pattern does not compile; values will be reported as invalid");
                Self::Malformed {
                    pattern: pattern.to_string(),
                    reason: error.to_string(),
                }
            }
        }
    }
}

/// Renders a value the way validation and text buffers see it.
///
/// Strings are returned verbatim, `null` becomes the empty string and every
/// other JSON value uses its compact JSON rendering.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// True for absent, null, or whitespace-only values.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// Parses a finite floating-point number from a JSON value or its text.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Validates one field's current value, returning the first failure message.
pub fn validate_field(field: &FormField, pattern: &CompiledPattern, value: Option<&Value>) -> Option<String> {
    let label = field.label.as_str();

    if is_blank(value) {
        return field.required.then(|| format!("{} is required", label));
    }
    // Non-blank implies present.
    let value = value?;
    let text = stringify_value(value);

    if let Some(message) = check_type(&field.field_type, label, value, &text) {
        return Some(message);
    }

    if let Some(message) = check_pattern(field, pattern, &text) {
        return Some(message);
    }

    if field.field_type == FieldType::Number
        && let Some(rules) = &field.validation
        && let Some(number) = numeric_value(value)
    {
        return check_range(label, rules, number);
    }

    None
}

fn check_type(field_type: &FieldType, label: &str, value: &Value, text: &str) -> Option<String> {
    match field_type {
        FieldType::Email if !EMAIL_REGEX.is_match(text.trim()) => Some(format!("{} must be a valid email address", label)),
        FieldType::Url if !is_web_url(text.trim()) => Some(format!("{} must be a valid URL", label)),
        FieldType::Number if numeric_value(value).is_none() => Some(format!("{} must be a valid number", label)),
        _ => None,
    }
}

fn is_web_url(text: &str) -> bool {
    match Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

fn check_pattern(field: &FormField, pattern: &CompiledPattern, text: &str) -> Option<String> {
    match pattern {
        CompiledPattern::Absent => None,
        CompiledPattern::Valid(regex) if regex.is_match(text) => None,
        CompiledPattern::Valid(_) => Some(
            field
                .validation
                .as_ref()
                .and_then(|rules| rules.message.clone())
                .unwrap_or_else(|| format!("{} format is invalid", field.label)),
        ),
        CompiledPattern::Malformed { .. } => Some(format!("{} format is invalid", field.label)),
    }
}

fn check_range(label: &str, rules: &FieldValidation, number: f64) -> Option<String> {
    if let Some(min) = rules.min
        && number < min
    {
        return Some(format!("{} must be at least {}", label, format_bound(min)));
    }
    if let Some(max) = rules.max
        && number > max
    {
        return Some(format!("{} must be at most {}", label, format_bound(max)));
    }
    None
}

/// Prints integral bounds without a trailing `.0`.
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}
