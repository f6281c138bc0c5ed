//! Canonical form for student input.

use crate::model::StudentFields;

/// Canonicalize raw student fields.
///
/// Trims every text field, lowercases `email` and uppercases `roll_no`. `status`
/// is left as supplied because status names are matched exactly. Absent fields
/// stay absent and fields that trim to nothing become `Some("")`; the repository
/// decides whether an empty value means "absent" (create) or "clear" (update).
pub fn normalize_student(raw: StudentFields) -> StudentFields {
    StudentFields {
        name: trimmed(raw.name),
        email: trimmed(raw.email).map(|e| e.to_lowercase()),
        roll_no: trimmed(raw.roll_no).map(|r| r.to_uppercase()),
        class: trimmed(raw.class),
        section: trimmed(raw.section),
        phone: trimmed(raw.phone),
        address: trimmed(raw.address),
        status: raw.status,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
