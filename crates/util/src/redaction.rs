//! Masks secret values before a form's values leave the process.
//!
//! A value is treated as secret when its field is a `password` field or when
//! the field id looks like a credential (`*_KEY`, `*_TOKEN`, `*_SECRET`,
//! `*_PASSWORD`, `DATABASE_URL`).

use formkit_types::{FieldType, FormField, FormValues};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Placeholder written in place of a secret value.
pub const REDACTED: &str = "<redacted>";

static SENSITIVE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)|DATABASE_URL|AUTHORIZATION)$").expect("sensitive key regex should compile")
});

/// Returns true when a field id names a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY_REGEX.is_match(key.trim())
}

/// Copies `values`, replacing every secret value with [`REDACTED`].
///
/// Unset and empty secrets are left as they are so callers can still tell
/// that nothing was entered.
pub fn redact_values(fields: &[FormField], values: &FormValues) -> FormValues {
    values
        .iter()
        .map(|(id, value)| {
            let is_secret = fields
                .iter()
                .find(|field| &field.id == id)
                .is_some_and(|field| field.field_type == FieldType::Password)
                || is_sensitive_key(id);
            let is_empty = matches!(value, Value::Null) || matches!(value, Value::String(text) if text.is_empty());
            if is_secret && !is_empty {
                (id.clone(), Value::String(REDACTED.to_string()))
            } else {
                (id.clone(), value.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_credential_keys() {
        assert!(is_sensitive_key("GITHUB_TOKEN"));
        assert!(is_sensitive_key("api_key"));
        assert!(is_sensitive_key("DATABASE_URL"));
        assert!(!is_sensitive_key("region"));
        assert!(!is_sensitive_key("KEYBOARD_LAYOUT"));
    }

    #[test]
    fn masks_password_fields_and_credential_keys() {
        let fields = vec![
            FormField::new("passphrase", FieldType::Password),
            FormField::new("SLACK_TOKEN", FieldType::Text),
            FormField::new("region", FieldType::Text),
        ];
        let values = FormValues::from([
            ("passphrase".to_string(), json!("hunter2")),
            ("SLACK_TOKEN".to_string(), json!("xoxb-1")),
            ("region".to_string(), json!("eu")),
        ]);

        let redacted = redact_values(&fields, &values);
        assert_eq!(redacted["passphrase"], json!(REDACTED));
        assert_eq!(redacted["SLACK_TOKEN"], json!(REDACTED));
        assert_eq!(redacted["region"], json!("eu"));
    }

    #[test]
    fn leaves_empty_secrets_visible() {
        let fields = vec![FormField::new("passphrase", FieldType::Password)];
        let values = FormValues::from([("passphrase".to_string(), json!(""))]);
        assert_eq!(redact_values(&fields, &values)["passphrase"], json!(""));
    }
}
