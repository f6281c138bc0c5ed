//! Error types for the record repositories.
//!
//! [`ProviderError`] is shared by the student repository and the generic record
//! repository, independent of the datastore behind them. The HTTP layer maps each
//! variant onto a status code in [`crate::server::ApiError`].

use crate::validation::{FieldError, describe_errors};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Validation failed: {}", describe_errors(.errors))]
    InvalidInput {
        /// Every failed rule, in field order
        errors: Vec<FieldError>,
    },

    #[error("{message}")]
    Duplicate {
        /// The type of record with the duplicate value
        resource_type: String,
        /// JSON name of the field holding the duplicate
        field: String,
        /// Client-facing description
        message: String,
    },

    #[error("{resource_type} not found")]
    NotFound {
        /// The type of record that was not found
        resource_type: String,
        /// The ID that was looked up
        id: String,
    },

    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl ProviderError {
    pub fn invalid_input(errors: Vec<FieldError>) -> Self {
        ProviderError::InvalidInput { errors }
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        ProviderError::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ProviderError::Internal {
            message: message.into(),
        }
    }
}
