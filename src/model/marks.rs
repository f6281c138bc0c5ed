use crate::providers::records::Record;
use crate::validation::{FieldError, FieldReader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A score for one exam. `marks` is not checked against `total_marks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    pub id: String,
    pub student_id: String,
    pub subject: String,
    pub exam_type: String,
    pub marks: f64,
    pub total_marks: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Marks {
    const COLLECTION: &'static str = "marks";
    const RESOURCE_TYPE: &'static str = "Marks";

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
        let subject = reader.required_str("subject");
        let exam_type = reader.required_str("examType");
        let marks = reader.required_f64("marks");
        let total_marks = reader.required_f64("totalMarks");
        let grade = reader.optional_str("grade");
        let teacher_id = reader.optional_str("teacherId");
        reader.finish()?;

        Ok(Marks {
            id,
            student_id,
            subject,
            exam_type,
            marks,
            total_marks,
            grade,
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
    fn test_from_input() {
        let input = json!({
            "studentId": "s1",
            "subject": "Science",
            "examType": "Midterm",
            "marks": 92,
            "totalMarks": 100,
            "grade": "A"
        });
        let marks = Marks::from_input("m1".to_string(), Utc::now(), &input).unwrap();
        assert_eq!(marks.marks, 92.0);
        assert_eq!(marks.grade.as_deref(), Some("A"));
        assert!(marks.teacher_id.is_none());
    }

    #[test]
    fn test_marks_above_total_are_accepted() {
        let input = json!({
            "studentId": "s1",
            "subject": "Science",
            "examType": "Quiz",
            "marks": 12,
            "totalMarks": 10
        });
        assert!(Marks::from_input("m1".to_string(), Utc::now(), &input).is_ok());
    }

    #[test]
    fn test_missing_total_marks() {
        let input = json!({"studentId": "s1", "subject": "Science", "examType": "Quiz", "marks": 5});
        let errors = Marks::from_input("m1".to_string(), Utc::now(), &input).unwrap_err();
        assert_eq!(errors[0].field, "totalMarks");
    }
}
