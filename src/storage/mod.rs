//! Storage abstraction layer for school records.
//!
//! This module separates persistence from record semantics. The [`StorageProvider`]
//! trait defines pure data operations on JSON documents grouped into collections,
//! so the repositories in [`crate::providers`] never care which backend is active.
//!
//! # Architecture
//!
//! The storage layer is responsible for:
//! - PUT/GET/DELETE operations on JSON documents
//! - Insertion-ordered listing and exact-match attribute lookups
//! - Enforcing unique indexes (the duplicate-key backstop)
//!
//! The storage layer is NOT responsible for:
//! - Timestamps, id generation or normalization
//! - Field validation
//! - Friendly duplicate messages (the repositories pre-check for those)
//!
//! At the storage level CREATE and UPDATE are the same operation: data is put at a key.
//!
//! # Example Usage
//!
//! ```rust
//! use school_portal::storage::{InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! storage.ensure_unique_index("students", "email").await?;
//!
//! let key = StorageKey::new("students", "123");
//! storage.put(key.clone(), json!({"id": "123", "email": "jane@x.com"})).await?;
//!
//! assert!(storage.get(key.clone()).await?.is_some());
//! assert!(storage.delete(key).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;
pub mod sqlite;


pub use errors::StorageError;
pub use in_memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Identifies a single document: `collection` → `record_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    collection: String,
    record_id: String,
}

impl StorageKey {
    /// Create a new storage key.
    pub fn new(collection: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            record_id: record_id.into(),
        }
    }

    /// Get the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Get the record ID.
    pub fn record_id(&self) -> &str {
        &self.record_id
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.record_id)
    }
}

/// Read a top-level attribute of a stored document as a string for comparison.
pub(crate) fn attribute_as_string(data: &Value, attribute: &str) -> Option<String> {
    match data.get(attribute)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Core trait for datastores holding school records.
///
/// # Design Principles
///
/// - **PUT Returns Data**: callers get back exactly what `get()` would return
/// - **DELETE Returns Boolean**: tells the caller whether the document existed
/// - **Unique Indexes Are Authoritative**: `put` must refuse a document whose
///   indexed attribute value is already held by a different record, even when
///   two writers race. The check and the write happen atomically.
/// - **Async First**: every operation returns a `Send` future
pub trait StorageProvider: Send + Sync {
    /// Declare a unique index on a top-level attribute of a collection.
    ///
    /// Idempotent. Documents missing the attribute are not constrained.
    fn ensure_unique_index(
        &self,
        collection: &str,
        attribute: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Store data at the specified key and return the stored data.
    ///
    /// # Behavior
    /// - An existing document at the same key is replaced and keeps its list position
    /// - Fails with [`StorageError::UniqueViolation`] if a unique index would be broken
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, StorageError>> + Send;

    /// Retrieve data by key. `None` if it doesn't exist.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// Delete data by key. `true` if the document existed.
    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// List every document of a collection in insertion order.
    fn list(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, StorageError>> + Send;

    /// Find documents whose top-level `attribute` equals `value` exactly.
    fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, StorageError>> + Send;
}

/// Datastore chosen at process start.
///
/// Production and demo mode run the same repositories; only this value differs.
#[derive(Clone)]
pub enum Datastore {
    Memory(InMemoryStorage),
    Sqlite(SqliteStorage),
}

impl Datastore {
    /// Human-readable description for the health endpoint and startup logs.
    pub fn describe(&self) -> String {
        match self {
            Datastore::Memory(_) => "Demo Mode (In-Memory)".to_string(),
            Datastore::Sqlite(storage) => format!("SQLite ({})", storage.location()),
        }
    }
}

impl StorageProvider for Datastore {
    async fn ensure_unique_index(&self, collection: &str, attribute: &str) -> Result<(), StorageError> {
        match self {
            Datastore::Memory(s) => s.ensure_unique_index(collection, attribute).await,
            Datastore::Sqlite(s) => s.ensure_unique_index(collection, attribute).await,
        }
    }

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, StorageError> {
        match self {
            Datastore::Memory(s) => s.put(key, data).await,
            Datastore::Sqlite(s) => s.put(key, data).await,
        }
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        match self {
            Datastore::Memory(s) => s.get(key).await,
            Datastore::Sqlite(s) => s.get(key).await,
        }
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, StorageError> {
        match self {
            Datastore::Memory(s) => s.delete(key).await,
            Datastore::Sqlite(s) => s.delete(key).await,
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        match self {
            Datastore::Memory(s) => s.list(collection).await,
            Datastore::Sqlite(s) => s.list(collection).await,
        }
    }

    async fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        match self {
            Datastore::Memory(s) => s.find_by_attribute(collection, attribute, value).await,
            Datastore::Sqlite(s) => s.find_by_attribute(collection, attribute, value).await,
        }
    }
}

#[cfg(test)]
mod key_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_key() {
        let key = StorageKey::new("students", "123");
        assert_eq!(key.collection(), "students");
        assert_eq!(key.record_id(), "123");
        assert_eq!(key.to_string(), "students/123");
    }

    #[test]
    fn test_attribute_as_string() {
        let doc = json!({"email": "a@b.com", "marks": 42, "active": true, "tags": ["x"]});
        assert_eq!(attribute_as_string(&doc, "email"), Some("a@b.com".to_string()));
        assert_eq!(attribute_as_string(&doc, "marks"), Some("42".to_string()));
        assert_eq!(attribute_as_string(&doc, "active"), Some("true".to_string()));
        assert_eq!(attribute_as_string(&doc, "tags"), None);
        assert_eq!(attribute_as_string(&doc, "missing"), None);
    }

    #[tokio::test]
    async fn test_datastore_delegates_to_memory() {
        let store = Datastore::Memory(InMemoryStorage::new());
        assert_eq!(store.describe(), "Demo Mode (In-Memory)");

        let key = StorageKey::new("teachers", "t1");
        store.put(key.clone(), json!({"id": "t1"})).await.unwrap();
        assert!(store.get(key).await.unwrap().is_some());
        assert_eq!(store.list("teachers").await.unwrap().len(), 1);
    }
}
