//! # Formkit Engine
//!
//! The Formkit Engine drives dynamic configuration forms: it takes a list of
//! field descriptors plus initial values, keeps per-field values and
//! validation errors, and reports `(values, is_valid)` to a listener on every
//! edit.
//!
//! ## Key Features
//!
//! - **Field normalization**: integration fields and MCP server parameters are
//!   normalized once into [`FormField`]
//! - **Type dispatch**: each field maps to a control description ([`ControlSpec`])
//! - **Validation**: required, type, pattern and range checks per field
//! - **Document loading**: YAML or JSON form documents via [`parse_form_file`]
//!
//! ## Usage
//!
//! ```rust
//! use formkit_engine::{FormEngine, parse_form_file};
//!
//! let temp_dir = tempfile::tempdir()?;
//! let form_path = temp_dir.path().join("github.yaml");
//! std::fs::write(&form_path, r#"
//! title: GitHub
//! fields:
//!   - id: token
//!     label: Token
//!     type: password
//!     required: true
//! "#)?;
//!
//! let document = parse_form_file(&form_path)?;
//! let mut form = FormEngine::without_listener(document.fields, &document.values)?;
//! assert!(!form.is_valid());
//! form.set_text("token", "ghp_123")?;
//! assert!(form.is_valid());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

pub mod control;
pub mod error;
pub mod field_state;
pub mod form;
pub mod text_buffer;
pub mod validation;

pub use control::{ControlKind, ControlSpec, InputMode};
pub use error::FormError;
pub use field_state::{FieldInput, FieldState};
pub use form::{FormChangeListener, FormEngine};
pub use formkit_types::{FieldDescriptor, FieldOption, FieldType, FieldValidation, FormField, FormValues};
pub use text_buffer::TextBuffer;

/// A form loaded from disk: normalized fields plus initial values.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDocument {
    pub title: Option<String>,
    pub fields: Vec<FormField>,
    pub values: FormValues,
}

#[derive(Deserialize)]
struct RawFormDocument {
    #[serde(default)]
    title: Option<String>,
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    values: FormValues,
}

/// Loads a form document from a YAML or JSON file.
///
/// The document holds an optional `title`, a `fields` list in either
/// descriptor shape, and optional initial `values` keyed by field id. JSON is
/// read through the YAML parser, so the file extension does not matter.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the document shape.
pub fn parse_form_file(file_path: impl AsRef<Path>) -> Result<FormDocument> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read form file: {}", file_path.display()))?;
    parse_form_str(&content).with_context(|| format!("Failed to parse form file: {}", file_path.display()))
}

/// Parses a form document from YAML or JSON text.
pub fn parse_form_str(content: &str) -> Result<FormDocument> {
    let raw: RawFormDocument = serde_yaml::from_str(content).context("Unsupported form document format; expected 'fields' list")?;
    Ok(FormDocument {
        title: raw.title,
        fields: raw.fields.iter().map(FieldDescriptor::normalize).collect(),
        values: raw.values,
    })
}
