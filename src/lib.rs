//! School administration backend.
//!
//! Student, teacher, attendance and marks records over a pluggable datastore,
//! with token-based authentication and a JSON HTTP API.
//!
//! # Core Components
//!
//! - [`StudentRepository`] - student lifecycle with normalization, validation and
//!   email/roll number uniqueness
//! - [`RecordRepository`] - CRUD for teachers, attendance and marks
//! - [`StorageProvider`] - datastore trait with in-memory and SQLite backends
//! - [`AuthService`] - registration, login and JWT verification
//! - [`server::router`] - the axum router serving `/api`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use school_portal::model::StudentFields;
//! use school_portal::providers::StudentRepository;
//! use school_portal::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let students = StudentRepository::new(InMemoryStorage::new()).await?;
//! let jane = students
//!     .create(StudentFields::new("Jane Doe", "jane@x.com", "R001", "10A"))
//!     .await?;
//! assert!(students.get(&jane.id).await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod demo;
pub mod error;
pub mod model;
pub mod providers;
pub mod server;
pub mod storage;
pub mod validation;

// Re-export commonly used types for convenience
pub use auth::{AuthError, AuthService, Claims, TokenIssuer};
pub use config::{ConfigError, ServerConfig, StorageBackend};
pub use error::{PortalError, PortalResult};
pub use model::{DeletedStudent, Student, StudentFields, StudentStatus};
pub use providers::{ProviderError, RecordRepository, StudentRepository};
pub use storage::{Datastore, InMemoryStorage, SqliteStorage, StorageError, StorageProvider};
pub use validation::FieldError;
