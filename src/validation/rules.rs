//! Student rule table.
//!
//! Each [`FieldRule`] pairs a field with a predicate and the message reported when
//! the predicate fails. [`validate_student`] walks the table; nothing here touches
//! the datastore.

use super::FieldError;
use crate::model::{StudentFields, StudentStatus};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .expect("email pattern is a valid regex")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9\s\-+()]{10,15}$").expect("phone pattern is a valid regex")
});

/// Fields of a student that carry rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    Name,
    Email,
    RollNo,
    Class,
    Section,
    Phone,
    Address,
    Status,
}

impl StudentField {
    /// Fields in the order errors are reported.
    pub const ALL: [StudentField; 8] = [
        StudentField::Name,
        StudentField::Email,
        StudentField::RollNo,
        StudentField::Class,
        StudentField::Section,
        StudentField::Phone,
        StudentField::Address,
        StudentField::Status,
    ];

    /// Name of the field in JSON bodies.
    pub fn json_name(&self) -> &'static str {
        match self {
            StudentField::Name => "name",
            StudentField::Email => "email",
            StudentField::RollNo => "rollNo",
            StudentField::Class => "class",
            StudentField::Section => "section",
            StudentField::Phone => "phone",
            StudentField::Address => "address",
            StudentField::Status => "status",
        }
    }

    /// Message for a required field that is absent or blank.
    pub fn required_message(&self) -> Option<&'static str> {
        match self {
            StudentField::Name => Some("Name is required"),
            StudentField::Email => Some("Email is required"),
            StudentField::RollNo => Some("Roll number is required"),
            StudentField::Class => Some("Class/Branch is required"),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required_message().is_some()
    }

    pub fn value<'a>(&self, fields: &'a StudentFields) -> Option<&'a str> {
        let value = match self {
            StudentField::Name => &fields.name,
            StudentField::Email => &fields.email,
            StudentField::RollNo => &fields.roll_no,
            StudentField::Class => &fields.class,
            StudentField::Section => &fields.section,
            StudentField::Phone => &fields.phone,
            StudentField::Address => &fields.address,
            StudentField::Status => &fields.status,
        };
        value.as_deref()
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: StudentField,
    pub check: fn(&str) -> bool,
    pub message: &'static str,
}

/// Whether a create must supply every required field or an update only some.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

pub static STUDENT_RULES: &[FieldRule] = &[
    FieldRule {
        field: StudentField::Name,
        check: name_long_enough,
        message: "Name must be at least 2 characters",
    },
    FieldRule {
        field: StudentField::Name,
        check: name_short_enough,
        message: "Name cannot exceed 50 characters",
    },
    FieldRule {
        field: StudentField::Email,
        check: is_valid_email,
        message: "Please enter a valid email",
    },
    FieldRule {
        field: StudentField::RollNo,
        check: is_present,
        message: "Roll number is required",
    },
    FieldRule {
        field: StudentField::Class,
        check: is_present,
        message: "Class/Branch is required",
    },
    FieldRule {
        field: StudentField::Phone,
        check: is_valid_phone,
        message: "Please enter a valid phone number",
    },
    FieldRule {
        field: StudentField::Address,
        check: address_short_enough,
        message: "Address cannot exceed 200 characters",
    },
    FieldRule {
        field: StudentField::Status,
        check: is_known_status,
        message: "Status must be one of Active, Inactive, Graduated, Suspended",
    },
];

fn name_long_enough(value: &str) -> bool {
    value.chars().count() >= 2
}

fn name_short_enough(value: &str) -> bool {
    value.chars().count() <= 50
}

fn is_present(value: &str) -> bool {
    !value.is_empty()
}

fn address_short_enough(value: &str) -> bool {
    value.chars().count() <= 200
}

fn is_known_status(value: &str) -> bool {
    value.parse::<StudentStatus>().is_ok()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_REGEX.is_match(value)
}

/// Validate normalized student fields.
///
/// Returns every failure in field order; an empty vector means the input is valid.
/// Blank optional fields are skipped since they mean "absent" on create and
/// "clear" on update. Blank required fields report the required message in
/// both modes.
pub fn validate_student(fields: &StudentFields, mode: ValidationMode) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for field in StudentField::ALL {
        match field.value(fields) {
            None => {
                if mode == ValidationMode::Create {
                    if let Some(message) = field.required_message() {
                        errors.push(FieldError::new(field.json_name(), message));
                    }
                }
            }
            Some("") => {
                if let Some(message) = field.required_message() {
                    errors.push(FieldError::new(field.json_name(), message));
                }
            }
            Some(value) => {
                errors.extend(
                    STUDENT_RULES
                        .iter()
                        .filter(|rule| rule.field == field && !(rule.check)(value))
                        .map(|rule| FieldError::new(field.json_name(), rule.message)),
                );
            }
        }
    }

    errors
}
