//! Storage-specific error types for pure data operations.
//!
//! These errors describe failures of the datastore itself, separate from record
//! validation or business rules. The one exception is [`StorageError::UniqueViolation`],
//! which is how a backend reports that its unique index rejected a write.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniquely indexed attribute already holds this value in another record.
    #[error("Unique index violation on {collection}.{attribute}: '{value}' already exists")]
    UniqueViolation {
        collection: String,
        attribute: String,
        value: String,
    },

    /// The document cannot be stored as given (not a JSON object).
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// The backend could not be opened or was asked for an unsafe index.
    #[error("Configuration error: {message}{}", parameter_suffix(.parameter))]
    Configuration {
        message: String,
        parameter: Option<String>,
    },

    /// A stored row did not hold valid JSON.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Any other failure reported by the backend.
    #[error("Internal storage error: {message}")]
    Internal { message: String },
}

fn parameter_suffix(parameter: &Option<String>) -> String {
    parameter
        .as_ref()
        .map(|p| format!(" (parameter: {})", p))
        .unwrap_or_default()
}

impl StorageError {
    pub fn unique_violation(
        collection: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::UniqueViolation {
            collection: collection.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            parameter: None,
        }
    }

    /// Configuration error naming the offending parameter.
    pub fn configuration_for(message: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The attribute that tripped a unique index, if this is a backstop rejection.
    pub fn violated_attribute(&self) -> Option<&str> {
        match self {
            StorageError::UniqueViolation { attribute, .. } => Some(attribute),
            _ => None,
        }
    }
}
