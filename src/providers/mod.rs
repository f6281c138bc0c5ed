//! Record repositories.
//!
//! Repositories hold the business rules for each record type and delegate
//! persistence to a [`StorageProvider`](crate::storage::StorageProvider), so the
//! same code runs over the in-memory demo store and SQLite.
//!
//! # Available Repositories
//!
//! * [`StudentRepository`] - normalization, rule-table validation and email/roll
//!   number uniqueness for students
//! * [`RecordRepository`] - required-field CRUD for teachers, attendance and marks

pub mod error;
pub mod records;
pub mod student;
pub mod uniqueness;

pub use error::ProviderError;
pub use records::{Record, RecordRepository};
pub use student::{STUDENTS, StudentRepository};
pub use uniqueness::{Conflict, UniqueField, UniquenessChecker};
