use crate::providers::records::Record;
use crate::validation::{FieldError, FieldReader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A teacher. Only presence of `name`, `email` and `subject` is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    /// Years of experience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Record for Teacher {
    const COLLECTION: &'static str = "teachers";
    const RESOURCE_TYPE: &'static str = "Teacher";

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
        let name = reader.required_str("name");
        let email = reader.required_str("email");
        let subject = reader.required_str("subject");
        let phone = reader.optional_str("phone");
        let address = reader.optional_str("address");
        let qualification = reader.optional_str("qualification");
        let experience = reader.optional_u32("experience");
        reader.finish()?;

        Ok(Teacher {
            id,
            name,
            email,
            subject,
            phone,
            address,
            qualification,
            experience,
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
            "name": "John Teacher",
            "email": "teacher@school.com",
            "subject": "Mathematics",
            "experience": 7,
            "classes": ["10A"]
        });
        let teacher = Teacher::from_input("t1".to_string(), Utc::now(), &input).unwrap();
        assert_eq!(teacher.subject, "Mathematics");
        assert_eq!(teacher.experience, Some(7));
        assert!(teacher.phone.is_none());

        let value = serde_json::to_value(&teacher).unwrap();
        assert!(value.get("classes").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_missing_subject() {
        let input = json!({"name": "A", "email": "a@b.com"});
        let errors = Teacher::from_input("t1".to_string(), Utc::now(), &input).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("subject", "subject is required")]);
    }
}
