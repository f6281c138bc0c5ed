//! In-memory storage implementation.
//!
//! Thread-safe storage built on `HashMap` behind a tokio `RwLock`. It backs demo
//! mode and most tests. Unique indexes are checked while the write lock is held,
//! so two racing writers can never both store the same indexed value.
//!
//! # Performance Characteristics
//!
//! * PUT: O(n) per unique index (scan of the collection), O(1) otherwise
//! * GET/DELETE: O(1) average case
//! * LIST/FIND_BY_ATTRIBUTE: O(n log n) / O(n)
//!
//! # Example Usage
//!
//! ```rust
//! use school_portal::storage::{InMemoryStorage, StorageError, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! storage.ensure_unique_index("students", "rollNo").await?;
//!
//! storage.put(StorageKey::new("students", "a"), json!({"rollNo": "R001"})).await?;
//! let clash = storage.put(StorageKey::new("students", "b"), json!({"rollNo": "R001"})).await;
//! assert!(matches!(clash, Err(StorageError::UniqueViolation { .. })));
//! # Ok(())
//! # }
//! ```

use crate::storage::{StorageError, StorageKey, StorageProvider, attribute_as_string};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collection {
    // record_id -> (insertion sequence, document)
    records: HashMap<String, (u64, Value)>,
    unique_attributes: Vec<String>,
    next_seq: u64,
}

impl Collection {
    fn find_conflict(&self, record_id: &str, data: &Value) -> Option<(String, String)> {
        for attribute in &self.unique_attributes {
            let Some(candidate) = attribute_as_string(data, attribute) else {
                continue;
            };
            let taken = self.records.iter().any(|(id, (_, existing))| {
                id != record_id
                    && attribute_as_string(existing, attribute).as_deref() == Some(candidate.as_str())
            });
            if taken {
                return Some((attribute.clone(), candidate));
            }
        }
        None
    }
}

/// Thread-safe in-memory storage implementation.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage instance.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl StorageProvider for InMemoryStorage {
    async fn ensure_unique_index(&self, collection: &str, attribute: &str) -> Result<(), StorageError> {
        let mut data_guard = self.data.write().await;
        let entry = data_guard.entry(collection.to_string()).or_default();
        if entry.unique_attributes.iter().any(|a| a == attribute) {
            return Ok(());
        }

        // Refuse to create an index the existing data already violates.
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (id, (_, doc)) in &entry.records {
            if let Some(value) = attribute_as_string(doc, attribute) {
                if seen.insert(value.clone(), id).is_some() {
                    return Err(StorageError::unique_violation(collection, attribute, value));
                }
            }
        }

        entry.unique_attributes.push(attribute.to_string());
        Ok(())
    }

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, StorageError> {
        if !data.is_object() {
            return Err(StorageError::invalid_data(format!(
                "Document for {} must be a JSON object",
                key
            )));
        }

        let mut data_guard = self.data.write().await;
        let collection = data_guard.entry(key.collection().to_string()).or_default();

        if let Some((attribute, value)) = collection.find_conflict(key.record_id(), &data) {
            return Err(StorageError::unique_violation(key.collection(), attribute, value));
        }

        let seq = match collection.records.get(key.record_id()) {
            Some((seq, _)) => *seq,
            None => {
                collection.next_seq += 1;
                collection.next_seq
            }
        };
        collection
            .records
            .insert(key.record_id().to_string(), (seq, data.clone()));

        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let data_guard = self.data.read().await;

        let result = data_guard
            .get(key.collection())
            .and_then(|collection| collection.records.get(key.record_id()))
            .map(|(_, doc)| doc.clone());

        Ok(result)
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, StorageError> {
        let mut data_guard = self.data.write().await;

        let existed = data_guard
            .get_mut(key.collection())
            .map(|collection| collection.records.remove(key.record_id()).is_some())
            .unwrap_or(false);

        Ok(existed)
    }

    async fn list(&self, collection: &str) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        let data_guard = self.data.read().await;

        let Some(entries) = data_guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut ordered: Vec<_> = entries.records.iter().collect();
        ordered.sort_by_key(|(_, (seq, _))| *seq);

        Ok(ordered
            .into_iter()
            .map(|(id, (_, doc))| (StorageKey::new(collection, id), doc.clone()))
            .collect())
    }

    async fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        let data_guard = self.data.read().await;

        let Some(entries) = data_guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<_> = entries
            .records
            .iter()
            .filter(|(_, (_, doc))| attribute_as_string(doc, attribute).as_deref() == Some(value))
            .collect();
        results.sort_by_key(|(_, (seq, _))| *seq);

        Ok(results
            .into_iter()
            .map(|(id, (_, doc))| (StorageKey::new(collection, id), doc.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_shared_storage_suite() {
        crate::storage::tests::test_storage_provider(InMemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_rejects_non_object_documents() {
        let storage = InMemoryStorage::new();
        let result = storage.put(StorageKey::new("students", "1"), json!("text")).await;
        assert!(matches!(result, Err(StorageError::InvalidData { .. })));
    }

    #[tokio::test]
    async fn test_index_creation_fails_over_existing_duplicates() {
        let storage = InMemoryStorage::new();
        storage
            .put(StorageKey::new("users", "1"), json!({"email": "dup@x.com"}))
            .await
            .unwrap();
        storage
            .put(StorageKey::new("users", "2"), json!({"email": "dup@x.com"}))
            .await
            .unwrap();

        let result = storage.ensure_unique_index("users", "email").await;
        assert!(matches!(result, Err(StorageError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_writers_cannot_both_win() {
        let storage = InMemoryStorage::new();
        storage.ensure_unique_index("students", "email").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .put(
                            StorageKey::new("students", format!("id-{}", i)),
                            json!({"email": "race@x.com"}),
                        )
                        .await
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(storage.list("students").await.unwrap().len(), 1);
    }
}
