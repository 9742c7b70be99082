//! Errors returned when a caller breaks the form's call contract.
//!
//! Validation failures are never reported here; they live in the form's
//! per-field error map.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Field at position {index} has an empty id")]
    EmptyFieldId { index: usize },

    #[error("Duplicate field id '{id}'")]
    DuplicateFieldId { id: String },

    #[error("Unknown field '{id}'")]
    UnknownField { id: String },

    #[error("Form is disabled; edit to '{id}' rejected")]
    Disabled { id: String },

    #[error("Field '{id}' has unsupported type '{field_type}' and cannot be edited")]
    NotEditable { id: String, field_type: String },

    #[error("Field '{id}' is a {actual} field and cannot be edited as {requested}")]
    KindMismatch {
        id: String,
        actual: String,
        requested: &'static str,
    },

    #[error("Value '{value}' is not an option of field '{id}'")]
    InvalidOption { id: String, value: String },
}

impl FormError {
    pub fn unknown_field(id: impl Into<String>) -> Self {
        Self::UnknownField { id: id.into() }
    }

    pub fn disabled(id: impl Into<String>) -> Self {
        Self::Disabled { id: id.into() }
    }

    pub fn invalid_option(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidOption {
            id: id.into(),
            value: value.into(),
        }
    }
}
