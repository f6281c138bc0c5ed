//! Email / roll number conflict lookup for students.

use crate::storage::{StorageError, StorageProvider};
use log::trace;
use std::fmt;

/// A student attribute that must be unique across all students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Email,
    RollNo,
}

impl UniqueField {
    /// Checked in this order; the first collision wins.
    pub const ALL: [UniqueField; 2] = [UniqueField::Email, UniqueField::RollNo];

    /// Attribute name in stored documents and JSON bodies.
    pub fn attribute(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::RollNo => "rollNo",
        }
    }

    pub fn from_attribute(attribute: &str) -> Option<Self> {
        UniqueField::ALL
            .into_iter()
            .find(|field| field.attribute() == attribute)
    }

    /// Wording used in messages about an existing record.
    pub fn label(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::RollNo => "roll number",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// Another record already holds a candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub field: UniqueField,
    pub existing_id: String,
}

/// Looks up email and roll number collisions in one collection.
///
/// Candidates must already be normalized. Stored values are normalized too, so an
/// exact match here is a case-insensitive match on the raw input.
pub struct UniquenessChecker<'a, S: StorageProvider> {
    storage: &'a S,
    collection: &'a str,
}

impl<'a, S: StorageProvider> UniquenessChecker<'a, S> {
    pub fn new(storage: &'a S, collection: &'a str) -> Self {
        Self {
            storage,
            collection,
        }
    }

    /// Find the first collision, checking email before roll number.
    ///
    /// `exclude_id` is the record being modified; its own values never conflict.
    /// Empty candidates are skipped.
    pub async fn check(
        &self,
        email: Option<&str>,
        roll_no: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Conflict>, StorageError> {
        for (field, candidate) in [(UniqueField::Email, email), (UniqueField::RollNo, roll_no)] {
            let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
                continue;
            };
            if let Some(existing_id) = self.find_other(field, candidate, exclude_id).await? {
                trace!(
                    "{} '{}' already held by {}/{}",
                    field, candidate, self.collection, existing_id
                );
                return Ok(Some(Conflict { field, existing_id }));
            }
        }
        Ok(None)
    }

    async fn find_other(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<String>, StorageError> {
        let matches = self
            .storage
            .find_by_attribute(self.collection, field.attribute(), value)
            .await?;

        Ok(matches
            .into_iter()
            .map(|(key, _)| key.record_id().to_string())
            .find(|id| Some(id.as_str()) != exclude_id))
    }
}
