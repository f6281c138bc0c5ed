//! SQLite-based storage implementation.
//!
//! Persistent storage with the same semantics as [`InMemoryStorage`](super::InMemoryStorage).
//! Every document lives in a single table keyed by `(collection, record_id)` with
//! the JSON text in `data`.
//!
//! # Database Schema
//!
//! - `collection`: Text field naming the record type (students, teachers, ...)
//! - `record_id`: Text field for the record identifier
//! - `data`: Text field containing the JSON document
//! - Primary key: (collection, record_id)
//!
//! Unique indexes are partial expression indexes, one per declared attribute:
//!
//! ```sql
//! CREATE UNIQUE INDEX "uq_students_email"
//!     ON records (json_extract(data, '$.email')) WHERE collection = 'students'
//! ```
//!
//! SQLite itself rejects conflicting writes, so the backstop holds across
//! connections and processes. Inserts use an upsert so that replacing a
//! document keeps its rowid, which is what `list` orders by.
//!
//! # Usage
//!
//! ```rust,no_run
//! use school_portal::storage::{SqliteStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = SqliteStorage::new_with_path("data/school_portal.db").await?;
//! storage.ensure_unique_index("students", "email").await?;
//!
//! let key = StorageKey::new("students", "123");
//! storage.put(key.clone(), json!({"id": "123", "email": "jane@x.com"})).await?;
//! let retrieved = storage.get(key).await?;
//! # Ok(())
//! # }
//! ```

use crate::storage::{StorageError, StorageKey, StorageProvider, attribute_as_string};
use log::{debug, warn};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

const MEMORY_LOCATION: &str = ":memory:";

/// SQLite-based storage provider.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    location: String,
    // (collection, attribute) pairs with a unique index, used to name the field on violation
    unique_indexes: Arc<RwLock<Vec<(String, String)>>>,
}

impl SqliteStorage {
    /// Open (or create) a database file.
    ///
    /// # Behavior
    /// - Creates the database file if it doesn't exist
    /// - Creates parent directories if they don't exist
    /// - Opens existing database for read-write access
    pub async fn new_with_path(database_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let database_path = database_path.as_ref();

        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::configuration(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::configuration(format!(
                    "Failed to connect to SQLite database at {}: {}",
                    database_path.display(),
                    e
                ))
            })?;

        let storage = Self {
            pool,
            location: database_path.display().to_string(),
            unique_indexes: Arc::new(RwLock::new(Vec::new())),
        };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    /// Create an in-memory SQLite database, mainly for tests.
    ///
    /// Each SQLite connection to `:memory:` gets a private database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn new_in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new().in_memory(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::configuration(format!("Failed to create in-memory SQLite: {}", e))
            })?;

        let storage = Self {
            pool,
            location: MEMORY_LOCATION.to_string(),
            unique_indexes: Arc::new(RwLock::new(Vec::new())),
        };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    /// Where this database lives: a file path or `:memory:`.
    pub fn location(&self) -> &str {
        &self.location
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                record_id TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (collection, record_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to create schema: {}", e)))?;

        Ok(())
    }

    fn index_name(collection: &str, attribute: &str) -> String {
        format!("uq_{}_{}", collection, attribute)
    }

    /// Translate a failed write into a UniqueViolation when SQLite says so.
    async fn map_write_error(&self, key: &StorageKey, data: &Value, error: sqlx::Error) -> StorageError {
        let message = error.to_string();
        let is_unique = error
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());

        if !is_unique {
            return StorageError::internal(format!("Failed to store record {}: {}", key, message));
        }

        let indexes = self.unique_indexes.read().await;
        let in_collection: Vec<&(String, String)> = indexes
            .iter()
            .filter(|(collection, _)| collection == key.collection())
            .collect();
        let named = in_collection
            .iter()
            .copied()
            .find(|(collection, attribute)| message.contains(&Self::index_name(collection, attribute)))
            .or_else(|| in_collection.first().copied());

        match named {
            Some((collection, attribute)) => {
                let value = attribute_as_string(data, attribute).unwrap_or_default();
                warn!("Unique index rejected write to {}: {}.{}", key, collection, attribute);
                StorageError::unique_violation(collection.clone(), attribute.clone(), value)
            }
            None => StorageError::internal(format!("Failed to store record {}: {}", key, message)),
        }
    }

    fn decode_row(collection: &str, row: &SqliteRow) -> Result<(StorageKey, Value), StorageError> {
        let record_id: String = row
            .try_get("record_id")
            .map_err(|e| StorageError::internal(format!("Malformed row: {}", e)))?;
        let data_str: String = row
            .try_get("data")
            .map_err(|e| StorageError::internal(format!("Malformed row: {}", e)))?;
        let data = serde_json::from_str(&data_str).map_err(|e| {
            StorageError::serialization(format!("Failed to deserialize data: {}", e))
        })?;
        Ok((StorageKey::new(collection, record_id), data))
    }
}

/// Collection and attribute names end up inside index DDL, so only plain identifiers pass.
fn validate_identifier(value: &str, parameter: &str) -> Result<(), StorageError> {
    let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::configuration_for(
            format!("'{}' is not a valid identifier", value),
            parameter,
        ))
    }
}

impl StorageProvider for SqliteStorage {
    async fn ensure_unique_index(&self, collection: &str, attribute: &str) -> Result<(), StorageError> {
        validate_identifier(collection, "collection")?;
        validate_identifier(attribute, "attribute")?;

        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON records (json_extract(data, '$.{}')) WHERE collection = '{}'",
            Self::index_name(collection, attribute),
            attribute,
            collection
        );

        sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                StorageError::unique_violation(collection, attribute, "")
            } else {
                StorageError::internal(format!("Failed to create unique index: {}", e))
            }
        })?;

        let mut indexes = self.unique_indexes.write().await;
        if !indexes.iter().any(|(c, a)| c == collection && a == attribute) {
            debug!("Unique index ready on {}.{}", collection, attribute);
            indexes.push((collection.to_string(), attribute.to_string()));
        }
        Ok(())
    }

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, StorageError> {
        if !data.is_object() {
            return Err(StorageError::invalid_data(format!(
                "Document for {} must be a JSON object",
                key
            )));
        }

        let data_str = serde_json::to_string(&data)
            .map_err(|e| StorageError::serialization(format!("Failed to serialize data: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO records (collection, record_id, data) VALUES (?, ?, ?)
             ON CONFLICT(collection, record_id) DO UPDATE SET data = excluded.data",
        )
        .bind(key.collection())
        .bind(key.record_id())
        .bind(&data_str)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(data),
            Err(e) => Err(self.map_write_error(&key, &data, e).await),
        }
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query("SELECT record_id, data FROM records WHERE collection = ? AND record_id = ?")
            .bind(key.collection())
            .bind(key.record_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("Failed to fetch record: {}", e)))?;

        match row {
            Some(row) => Ok(Some(Self::decode_row(key.collection(), &row)?.1)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND record_id = ?")
            .bind(key.collection())
            .bind(key.record_id())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("Failed to delete record: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        let rows = sqlx::query("SELECT record_id, data FROM records WHERE collection = ? ORDER BY rowid")
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("Failed to list records: {}", e)))?;

        rows.iter()
            .map(|row| Self::decode_row(collection, row))
            .collect()
    }

    async fn find_by_attribute(
        &self,
        collection: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, StorageError> {
        validate_identifier(attribute, "attribute")?;

        let rows = sqlx::query(
            "SELECT record_id, data FROM records
             WHERE collection = ? AND CAST(json_extract(data, ?) AS TEXT) = ?
             ORDER BY rowid",
        )
        .bind(collection)
        .bind(format!("$.{}", attribute))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("Failed to search records: {}", e)))?;

        rows.iter()
            .map(|row| Self::decode_row(collection, row))
            .collect()
    }
}
