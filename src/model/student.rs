//! Student records and the request shapes that create or modify them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Suspended,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 4] = [
        StudentStatus::Active,
        StudentStatus::Inactive,
        StudentStatus::Graduated,
        StudentStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Inactive => "Inactive",
            StudentStatus::Graduated => "Graduated",
            StudentStatus::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    /// Exact, case-sensitive match against the four status names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("'{}' is not a valid student status", s))
    }
}

/// A persisted student.
///
/// Invariants held by [`StudentRepository`](crate::providers::StudentRepository):
/// `email` is lowercase and `roll_no` uppercase, both unique across students;
/// `name`, `email`, `roll_no` and `class` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw student fields as supplied by a caller.
///
/// Every field is optional so the same shape serves full creates and partial
/// updates. `status` stays a string until validation so that a bad value becomes
/// an itemized validation failure rather than a body parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roll_no: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl StudentFields {
    /// Fields for a create request carrying the four required values.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        roll_no: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            roll_no: Some(roll_no.into()),
            class: Some(class.into()),
            ..Self::default()
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// True when the request would touch a uniquely indexed field.
    pub fn touches_unique_fields(&self) -> bool {
        self.email.is_some() || self.roll_no.is_some()
    }
}

/// Confirmation payload returned after a student is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedStudent {
    pub name: String,
    pub roll_no: String,
}

impl From<&Student> for DeletedStudent {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_no: student.roll_no.clone(),
        }
    }
}
