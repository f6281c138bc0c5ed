//! Student repository: the record lifecycle over any datastore.
//!
//! Every mutation normalizes the raw fields, validates them against the rule
//! table, checks email/roll number uniqueness, then issues a single `put`. Create
//! validates before the uniqueness check; update looks the record up and checks
//! uniqueness before validating the supplied fields. Nothing is written unless
//! every stage passes, so a failed create or update leaves the datastore untouched.
//!
//! Uniqueness is enforced twice. The pre-check gives friendly messages, and the
//! datastore's unique indexes catch the race where two writers pass the
//! pre-check at the same time.
//!
//! # Example Usage
//!
//! ```rust
//! use school_portal::model::StudentFields;
//! use school_portal::providers::StudentRepository;
//! use school_portal::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = StudentRepository::new(InMemoryStorage::new()).await?;
//!
//! let student = repository
//!     .create(StudentFields::new("  Jane Doe ", "Jane@X.com", "r001", "10A"))
//!     .await?;
//! assert_eq!(student.email, "jane@x.com");
//! assert_eq!(student.roll_no, "R001");
//! # Ok(())
//! # }
//! ```

use crate::model::{DeletedStudent, Student, StudentFields, StudentStatus};
use crate::providers::ProviderError;
use crate::providers::uniqueness::{Conflict, UniqueField, UniquenessChecker};
use crate::storage::{StorageError, StorageKey, StorageProvider};
use crate::validation::{ValidationMode, describe_errors, normalize_student, validate_student};
use chrono::Utc;
use log::{debug, error, info, trace, warn};
use serde_json::Value;

/// Collection holding student documents.
pub const STUDENTS: &str = "students";

const RESOURCE_TYPE: &str = "Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Update,
}

/// Repository for [`Student`] records with pluggable storage.
#[derive(Clone)]
pub struct StudentRepository<S: StorageProvider> {
    storage: S,
}

impl<S: StorageProvider> StudentRepository<S> {
    /// Create a repository and declare the unique indexes on email and roll number.
    pub async fn new(storage: S) -> Result<Self, ProviderError> {
        for field in UniqueField::ALL {
            storage
                .ensure_unique_index(STUDENTS, field.attribute())
                .await
                .map_err(|e| ProviderError::Storage {
                    message: format!("Failed to create {} index: {}", field, e),
                })?;
        }
        Ok(Self { storage })
    }

    /// The datastore this repository writes to.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All students, newest first. Records created in the same instant are
    /// returned most recently inserted first. Undecodable documents are skipped.
    pub async fn list(&self) -> Result<Vec<Student>, ProviderError> {
        debug!("Listing {} records", RESOURCE_TYPE);

        let stored = self
            .storage
            .list(STUDENTS)
            .await
            .map_err(|e| storage_failure("list", e))?;

        let mut students: Vec<Student> = stored
            .into_iter()
            .filter_map(|(key, data)| match decode(data) {
                Ok(student) => Some(student),
                Err(e) => {
                    warn!("Skipping {} during list: {}", key, e);
                    None
                }
            })
            .collect();

        // Reverse insertion order first so the stable sort keeps it for ties.
        students.reverse();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Found {} {} records", students.len(), RESOURCE_TYPE);
        Ok(students)
    }

    /// Fetch one student. Unknown or malformed ids yield `None`.
    pub async fn get(&self, id: &str) -> Result<Option<Student>, ProviderError> {
        debug!("Getting {} with ID '{}'", RESOURCE_TYPE, id);

        let data = self
            .storage
            .get(StorageKey::new(STUDENTS, id))
            .await
            .map_err(|e| storage_failure("get", e))?;

        match data {
            Some(data) => {
                trace!("{} '{}' found", RESOURCE_TYPE, id);
                decode(data).map(Some)
            }
            None => {
                debug!("{} '{}' not found", RESOURCE_TYPE, id);
                Ok(None)
            }
        }
    }

    /// Create a student from raw fields.
    pub async fn create(&self, fields: StudentFields) -> Result<Student, ProviderError> {
        let fields = normalize_student(fields);
        info!(
            "Creating {} record (rollNo '{}')",
            RESOURCE_TYPE,
            fields.roll_no.as_deref().unwrap_or_default()
        );

        let errors = validate_student(&fields, ValidationMode::Create);
        if !errors.is_empty() {
            warn!("Rejected {} create: {}", RESOURCE_TYPE, describe_errors(&errors));
            return Err(ProviderError::invalid_input(errors));
        }

        self.ensure_unique(&fields, None, Operation::Create).await?;

        let status = parse_status(fields.status.as_deref())?.unwrap_or_default();
        let now = Utc::now();
        let student = Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name.unwrap_or_default(),
            email: fields.email.unwrap_or_default(),
            roll_no: fields.roll_no.unwrap_or_default(),
            class: fields.class.unwrap_or_default(),
            section: non_empty(fields.section),
            phone: non_empty(fields.phone),
            address: non_empty(fields.address),
            status,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store(&student, Operation::Create).await?;
        info!("Created {} '{}' ({})", RESOURCE_TYPE, stored.name, stored.id);
        Ok(stored)
    }

    /// Apply a partial update. Only supplied fields change; a blank optional
    /// field clears it.
    pub async fn update(&self, id: &str, fields: StudentFields) -> Result<Student, ProviderError> {
        info!("Updating {} with ID '{}'", RESOURCE_TYPE, id);

        let Some(mut student) = self.get(id).await? else {
            warn!("Attempted to update non-existent {} '{}'", RESOURCE_TYPE, id);
            return Err(ProviderError::not_found(RESOURCE_TYPE, id));
        };

        // Normalized first so the conflict lookup is case-insensitive. A collision
        // is reported ahead of any rule failure.
        let fields = normalize_student(fields);
        if fields.touches_unique_fields() {
            self.ensure_unique(&fields, Some(id), Operation::Update)
                .await?;
        }

        let errors = validate_student(&fields, ValidationMode::Update);
        if !errors.is_empty() {
            warn!(
                "Rejected {} update of '{}': {}",
                RESOURCE_TYPE,
                id,
                describe_errors(&errors)
            );
            return Err(ProviderError::invalid_input(errors));
        }

        let status = parse_status(fields.status.as_deref())?;
        merge(&mut student, fields, status);
        student.updated_at = Utc::now();

        let stored = self.store(&student, Operation::Update).await?;
        info!("Updated {} '{}' ({})", RESOURCE_TYPE, stored.name, stored.id);
        Ok(stored)
    }

    /// Remove a student and report who was removed.
    pub async fn delete(&self, id: &str) -> Result<DeletedStudent, ProviderError> {
        info!("Deleting {} with ID '{}'", RESOURCE_TYPE, id);

        let Some(student) = self.get(id).await? else {
            warn!("Attempted to delete non-existent {} '{}'", RESOURCE_TYPE, id);
            return Err(ProviderError::not_found(RESOURCE_TYPE, id));
        };

        let removed = self
            .storage
            .delete(StorageKey::new(STUDENTS, id))
            .await
            .map_err(|e| storage_failure("delete", e))?;

        // Lost a race with another delete.
        if !removed {
            return Err(ProviderError::not_found(RESOURCE_TYPE, id));
        }

        info!("Deleted {} '{}' ({})", RESOURCE_TYPE, student.name, id);
        Ok(DeletedStudent::from(&student))
    }

    async fn ensure_unique(
        &self,
        fields: &StudentFields,
        exclude_id: Option<&str>,
        operation: Operation,
    ) -> Result<(), ProviderError> {
        let checker = UniquenessChecker::new(&self.storage, STUDENTS);
        let conflict = checker
            .check(fields.email.as_deref(), fields.roll_no.as_deref(), exclude_id)
            .await
            .map_err(|e| storage_failure("uniqueness check", e))?;

        match conflict {
            Some(Conflict { field, existing_id }) => {
                warn!(
                    "Duplicate {} for {} (held by '{}')",
                    field, RESOURCE_TYPE, existing_id
                );
                Err(duplicate(field, operation))
            }
            None => Ok(()),
        }
    }

    async fn store(&self, student: &Student, operation: Operation) -> Result<Student, ProviderError> {
        let data = serde_json::to_value(student).map_err(|e| {
            ProviderError::internal(format!("Failed to serialize {}: {}", RESOURCE_TYPE, e))
        })?;

        let stored = self
            .storage
            .put(StorageKey::new(STUDENTS, &student.id), data)
            .await
            .map_err(|e| {
                let violated = e.violated_attribute().and_then(UniqueField::from_attribute);
                match violated {
                    Some(field) => {
                        warn!("Unique index rejected {} write: {}", RESOURCE_TYPE, e);
                        duplicate(field, operation)
                    }
                    None => storage_failure("put", e),
                }
            })?;

        decode(stored)
    }
}

fn decode(data: Value) -> Result<Student, ProviderError> {
    serde_json::from_value(data).map_err(|e| {
        ProviderError::internal(format!("Failed to deserialize stored {}: {}", RESOURCE_TYPE, e))
    })
}

fn storage_failure(action: &str, e: StorageError) -> ProviderError {
    error!("Storage error during {} {}: {}", RESOURCE_TYPE, action, e);
    ProviderError::Storage {
        message: format!("Storage error during {}: {}", action, e),
    }
}

fn duplicate(field: UniqueField, operation: Operation) -> ProviderError {
    let message = match operation {
        Operation::Create => format!("{} with this {} already exists", RESOURCE_TYPE, field),
        Operation::Update => format!("Another student with this {} already exists", field.label()),
    };
    ProviderError::Duplicate {
        resource_type: RESOURCE_TYPE.to_string(),
        field: field.attribute().to_string(),
        message,
    }
}

/// Status has already passed validation; a failure here is a programming error.
fn parse_status(status: Option<&str>) -> Result<Option<StudentStatus>, ProviderError> {
    status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<StudentStatus>().map_err(ProviderError::internal))
        .transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn merge(student: &mut Student, fields: StudentFields, status: Option<StudentStatus>) {
    if let Some(name) = fields.name {
        student.name = name;
    }
    if let Some(email) = fields.email {
        student.email = email;
    }
    if let Some(roll_no) = fields.roll_no {
        student.roll_no = roll_no;
    }
    if let Some(class) = fields.class {
        student.class = class;
    }
    if let Some(section) = fields.section {
        student.section = non_empty(Some(section));
    }
    if let Some(phone) = fields.phone {
        student.phone = non_empty(Some(phone));
    }
    if let Some(address) = fields.address {
        student.address = non_empty(Some(address));
    }
    if let Some(status) = status {
        student.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    async fn repository() -> StudentRepository<InMemoryStorage> {
        StudentRepository::new(InMemoryStorage::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_normalizes_and_defaults() {
        let repo = repository().await;
        let student = repo
            .create(StudentFields::new("  Jane Doe ", "Jane@X.com", "r001", "10A"))
            .await
            .unwrap();

        assert_eq!(student.name, "Jane Doe");
        assert_eq!(student.email, "jane@x.com");
        assert_eq!(student.roll_no, "R001");
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.created_at, student.updated_at);
        assert!(student.phone.is_none());
    }

    #[tokio::test]
    async fn test_create_drops_blank_optionals() {
        let repo = repository().await;
        let student = repo
            .create(
                StudentFields::new("Jane Doe", "jane@x.com", "R001", "10A")
                    .with_phone("  ")
                    .with_section(" B ")
                    .with_status("Suspended"),
            )
            .await
            .unwrap();

        assert!(student.phone.is_none());
        assert_eq!(student.section.as_deref(), Some("B"));
        assert_eq!(student.status, StudentStatus::Suspended);
    }

    #[tokio::test]
    async fn test_update_clears_optional_field() {
        let repo = repository().await;
        let student = repo
            .create(
                StudentFields::new("Jane Doe", "jane@x.com", "R001", "10A")
                    .with_address("12 Long Road"),
            )
            .await
            .unwrap();

        let updated = repo
            .update(&student.id, StudentFields::default().with_address(""))
            .await
            .unwrap();
        assert!(updated.address.is_none());
        assert_eq!(updated.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_update_with_invalid_field_changes_nothing() {
        let repo = repository().await;
        let student = repo
            .create(StudentFields::new("Jane Doe", "jane@x.com", "R001", "10A"))
            .await
            .unwrap();

        let result = repo
            .update(&student.id, StudentFields::default().with_status("Retired"))
            .await;
        assert!(matches!(result, Err(ProviderError::InvalidInput { .. })));

        let stored = repo.get(&student.id).await.unwrap().unwrap();
        assert_eq!(stored, student);
    }

    #[tokio::test]
    async fn test_backstop_violation_maps_to_duplicate() {
        let repo = repository().await;
        // A record written around the repository, as a racing writer would.
        repo.storage()
            .put(
                StorageKey::new(STUDENTS, "ghost"),
                json!({"id": "ghost", "email": "ghost@x.com", "rollNo": "G1"}),
            )
            .await
            .unwrap();

        let student = Student {
            id: "new".to_string(),
            name: "Ghost Two".to_string(),
            email: "ghost@x.com".to_string(),
            roll_no: "G2".to_string(),
            class: "10A".to_string(),
            section: None,
            phone: None,
            address: None,
            status: StudentStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        match repo.store(&student, Operation::Create).await {
            Err(ProviderError::Duplicate { field, message, .. }) => {
                assert_eq!(field, "email");
                assert_eq!(message, "Student with this email already exists");
            }
            other => panic!("Expected Duplicate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_skips_undecodable_documents() {
        let repo = repository().await;
        repo.storage()
            .put(StorageKey::new(STUDENTS, "junk"), json!({"id": "junk"}))
            .await
            .unwrap();
        let created = repo
            .create(StudentFields::new("Jane Doe", "jane@x.com", "R001", "10A"))
            .await
            .unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn test_duplicate_messages() {
        assert_eq!(
            duplicate(UniqueField::RollNo, Operation::Create).to_string(),
            "Student with this rollNo already exists"
        );
        assert_eq!(
            duplicate(UniqueField::RollNo, Operation::Update).to_string(),
            "Another student with this roll number already exists"
        );
        assert_eq!(
            duplicate(UniqueField::Email, Operation::Update).to_string(),
            "Another student with this email already exists"
        );
    }
}
