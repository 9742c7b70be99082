//! Small helpers shared by the Formkit CLI: path expansion and redaction of
//! secret form values before they are printed.

pub mod path_processing;
pub mod redaction;

pub use path_processing::expand_tilde;
pub use redaction::{REDACTED, is_sensitive_key, redact_values};
