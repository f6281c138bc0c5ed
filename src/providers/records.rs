//! Generic repository for the secondary records (teachers, attendance, marks).
//!
//! These records carry only required-field checks, so one repository serves all
//! of them. Each record type describes its collection and how to build itself from
//! a JSON body through the [`Record`] trait.

use crate::providers::ProviderError;
use crate::storage::{StorageError, StorageKey, StorageProvider};
use crate::validation::{FieldError, describe_errors};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// A record type stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the records live in.
    const COLLECTION: &'static str;
    /// Name used in logs and "not found" messages.
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Build a record from a JSON body, checking required fields.
    ///
    /// `id` and `created_at` are assigned by the repository; any values for them
    /// in `input` are ignored.
    fn from_input(
        id: String,
        created_at: DateTime<Utc>,
        input: &Value,
    ) -> Result<Self, Vec<FieldError>>;
}

/// Field linking attendance and marks to a student.
const STUDENT_ID: &str = "studentId";

/// Repository for any [`Record`] with pluggable storage.
pub struct RecordRepository<S: StorageProvider, R: Record> {
    storage: S,
    _record: PhantomData<fn() -> R>,
}

impl<S: StorageProvider + Clone, R: Record> Clone for RecordRepository<S, R> {
    fn clone(&self) -> Self {
        Self::new(self.storage.clone())
    }
}

impl<S: StorageProvider, R: Record> RecordRepository<S, R> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<R>, ProviderError> {
        debug!("Listing {} records", R::RESOURCE_TYPE);
        let stored = self
            .storage
            .list(R::COLLECTION)
            .await
            .map_err(|e| storage_failure::<R>("list", e))?;
        let records = newest_first(decode_all::<R>(stored));
        debug!("Found {} {} records", records.len(), R::RESOURCE_TYPE);
        Ok(records)
    }

    /// Records whose `studentId` matches, newest first.
    pub async fn list_by_student(&self, student_id: &str) -> Result<Vec<R>, ProviderError> {
        debug!(
            "Listing {} records for student '{}'",
            R::RESOURCE_TYPE,
            student_id
        );
        let stored = self
            .storage
            .find_by_attribute(R::COLLECTION, STUDENT_ID, student_id)
            .await
            .map_err(|e| storage_failure::<R>("find", e))?;
        Ok(newest_first(decode_all::<R>(stored)))
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, ProviderError> {
        debug!("Getting {} with ID '{}'", R::RESOURCE_TYPE, id);
        let data = self
            .storage
            .get(StorageKey::new(R::COLLECTION, id))
            .await
            .map_err(|e| storage_failure::<R>("get", e))?;
        data.map(decode::<R>).transpose()
    }

    pub async fn create(&self, input: &Value) -> Result<R, ProviderError> {
        info!("Creating {} record", R::RESOURCE_TYPE);
        let record = R::from_input(uuid::Uuid::new_v4().to_string(), Utc::now(), input)
            .map_err(rejected::<R>)?;
        let stored = self.store(&record).await?;
        info!("Created {} '{}'", R::RESOURCE_TYPE, stored.id());
        Ok(stored)
    }

    /// Merge the supplied fields into the stored record and re-check it.
    pub async fn update(&self, id: &str, input: &Value) -> Result<R, ProviderError> {
        info!("Updating {} with ID '{}'", R::RESOURCE_TYPE, id);

        let Some(existing) = self.get(id).await? else {
            warn!(
                "Attempted to update non-existent {} '{}'",
                R::RESOURCE_TYPE,
                id
            );
            return Err(ProviderError::not_found(R::RESOURCE_TYPE, id));
        };

        let Some(changes) = input.as_object() else {
            return Err(rejected::<R>(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
            )]));
        };

        let mut merged = serde_json::to_value(&existing).map_err(|e| {
            ProviderError::internal(format!(
                "Failed to serialize {}: {}",
                R::RESOURCE_TYPE,
                e
            ))
        })?;
        if let Some(target) = merged.as_object_mut() {
            for (field, value) in changes {
                if field != "id" && field != "createdAt" {
                    target.insert(field.clone(), value.clone());
                }
            }
        }

        let record = R::from_input(existing.id().to_string(), existing.created_at(), &merged)
            .map_err(rejected::<R>)?;
        let stored = self.store(&record).await?;
        info!("Updated {} '{}'", R::RESOURCE_TYPE, id);
        Ok(stored)
    }

    pub async fn delete(&self, id: &str) -> Result<R, ProviderError> {
        info!("Deleting {} with ID '{}'", R::RESOURCE_TYPE, id);

        let Some(existing) = self.get(id).await? else {
            warn!(
                "Attempted to delete non-existent {} '{}'",
                R::RESOURCE_TYPE,
                id
            );
            return Err(ProviderError::not_found(R::RESOURCE_TYPE, id));
        };

        let removed = self
            .storage
            .delete(StorageKey::new(R::COLLECTION, id))
            .await
            .map_err(|e| storage_failure::<R>("delete", e))?;
        if !removed {
            return Err(ProviderError::not_found(R::RESOURCE_TYPE, id));
        }

        debug!("Deleted {} '{}'", R::RESOURCE_TYPE, id);
        Ok(existing)
    }

    async fn store(&self, record: &R) -> Result<R, ProviderError> {
        let data = serde_json::to_value(record).map_err(|e| {
            ProviderError::internal(format!(
                "Failed to serialize {}: {}",
                R::RESOURCE_TYPE,
                e
            ))
        })?;
        let stored = self
            .storage
            .put(StorageKey::new(R::COLLECTION, record.id()), data)
            .await
            .map_err(|e| storage_failure::<R>("put", e))?;
        decode::<R>(stored)
    }
}

fn decode<R: Record>(data: Value) -> Result<R, ProviderError> {
    serde_json::from_value(data).map_err(|e| {
        ProviderError::internal(format!(
            "Failed to deserialize stored {}: {}",
            R::RESOURCE_TYPE,
            e
        ))
    })
}

/// Skip undecodable documents instead of failing the whole listing.
fn decode_all<R: Record>(stored: Vec<(StorageKey, Value)>) -> Vec<R> {
    stored
        .into_iter()
        .filter_map(|(key, data)| match decode::<R>(data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {} during list: {}", key, e);
                None
            }
        })
        .collect()
}

fn newest_first<R: Record>(mut records: Vec<R>) -> Vec<R> {
    records.reverse();
    records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));
    records
}

fn rejected<R: Record>(errors: Vec<FieldError>) -> ProviderError {
    warn!(
        "Rejected {} input: {}",
        R::RESOURCE_TYPE,
        describe_errors(&errors)
    );
    ProviderError::invalid_input(errors)
}

fn storage_failure<R: Record>(action: &str, e: StorageError) -> ProviderError {
    error!("Storage error during {} {}: {}", R::RESOURCE_TYPE, action, e);
    ProviderError::Storage {
        message: format!("Storage error during {}: {}", action, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attendance, Marks, Teacher};
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    fn teachers() -> RecordRepository<InMemoryStorage, Teacher> {
        RecordRepository::new(InMemoryStorage::new())
    }

    fn math_teacher() -> Value {
        json!({"name": "John Teacher", "email": "teacher@school.com", "subject": "Mathematics"})
    }

    #[tokio::test]
    async fn test_teacher_crud() {
        let repo = teachers();
        let created = repo.create(&math_teacher()).await.unwrap();
        assert_eq!(repo.get(&created.id).await.unwrap(), Some(created.clone()));

        let updated = repo
            .update(&created.id, &json!({"subject": "Physics", "id": "hijack"}))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.subject, "Physics");
        assert_eq!(updated.name, "John Teacher");
        assert_eq!(updated.created_at, created.created_at);

        let deleted = repo.delete(&created.id).await.unwrap();
        assert_eq!(deleted.subject, "Physics");
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rechecks_required_fields() {
        let repo = teachers();
        let created = repo.create(&math_teacher()).await.unwrap();

        let result = repo.update(&created.id, &json!({"subject": ""})).await;
        assert!(matches!(result, Err(ProviderError::InvalidInput { .. })));
        assert_eq!(
            repo.get(&created.id).await.unwrap().unwrap().subject,
            "Mathematics"
        );
    }

    #[tokio::test]
    async fn test_missing_records() {
        let repo = teachers();
        assert!(matches!(
            repo.update("nope", &json!({})).await,
            Err(ProviderError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete("nope").await,
            Err(ProviderError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let repo: RecordRepository<_, Marks> = RecordRepository::new(InMemoryStorage::new());
        match repo.create(&json!({"studentId": "s1"})).await {
            Err(ProviderError::InvalidInput { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["subject", "examType", "marks", "totalMarks"]);
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_student_newest_first() {
        let repo: RecordRepository<_, Attendance> = RecordRepository::new(InMemoryStorage::new());
        for (student, subject) in [("s1", "Math"), ("s2", "Math"), ("s1", "Science")] {
            repo.create(&json!({
                "studentId": student,
                "date": "2024-01-15",
                "subject": subject,
                "status": "present"
            }))
            .await
            .unwrap();
        }

        let for_s1 = repo.list_by_student("s1").await.unwrap();
        let subjects: Vec<&str> = for_s1.iter().map(|a| a.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Science", "Math"]);
        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert!(repo.list_by_student("s3").await.unwrap().is_empty());
    }
}
