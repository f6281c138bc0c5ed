//! Input normalization and validation.
//!
//! Student input goes through two pure stages before any datastore access:
//! [`normalize::normalize_student`] canonicalizes the raw strings, then
//! [`rules::validate_student`] runs the rule table and collects every failure.
//! Secondary records use the lighter [`fields::FieldReader`], which only checks
//! that required values are present and well typed.

pub mod fields;
pub mod normalize;
pub mod rules;

pub use fields::FieldReader;
pub use normalize::normalize_student;
pub use rules::{STUDENT_RULES, StudentField, ValidationMode, validate_student};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failed rule: the JSON name of the field and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join a list of field errors into one line for logs and error displays.
pub fn describe_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
