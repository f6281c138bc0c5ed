//! Top-level error type for starting and running the portal.
//!
//! Request-level failures are handled by [`crate::server::ApiError`]; this type
//! covers what can stop the process: bad configuration, an unreachable datastore,
//! seeding failures and socket errors.

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::providers::ProviderError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Repository error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for startup and seeding.
pub type PortalResult<T> = Result<T, PortalError>;
