use crate::providers::records::Record;
use crate::validation::{FieldError, FieldReader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub const NAMES: [&'static str; 2] = ["present", "absent"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

/// One attendance mark for a student in a subject on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Attendance {
    const COLLECTION: &'static str = "attendance";
    const RESOURCE_TYPE: &'static str = "Attendance";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_input(
        id: String,
        created_at: DateTime<Utc>,
        input: &Value,
    ) -> Result<Self, Vec<FieldError>> {
        let mut reader = FieldReader::new(input)?;
        let student_id = reader.required_str("studentId");
        let date = reader.required_date("date");
        let subject = reader.required_str("subject");
        let status = reader.required_choice("status", &AttendanceStatus::NAMES);
        let teacher_id = reader.optional_str("teacherId");
        reader.finish()?;

        let status = AttendanceStatus::from_name(&status).ok_or_else(|| {
            vec![FieldError::new("status", "status must be one of present, absent")]
        })?;

        Ok(Attendance {
            id,
            student_id,
            date,
            subject,
            status,
            teacher_id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_input_with_plain_date() {
        let input = json!({
            "studentId": "s1",
            "date": "2024-01-15",
            "subject": "Mathematics",
            "status": "present"
        });
        let record = Attendance::from_input("a1".to_string(), Utc::now(), &input).unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.date.to_rfc3339(), "2024-01-15T00:00:00+00:00");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "present");
        assert_eq!(value["studentId"], "s1");
    }

    #[test]
    fn test_rejects_unknown_status_and_missing_subject() {
        let input = json!({"studentId": "s1", "date": "2024-01-15", "status": "late"});
        let errors = Attendance::from_input("a1".to_string(), Utc::now(), &input).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["subject", "status"]);
    }
}
