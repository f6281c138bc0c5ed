//! Required-field extraction for teacher, attendance and marks input.
//!
//! These records only need presence and type checks, so instead of a rule table
//! they read straight out of the JSON body. A reader accumulates every problem
//! and reports them together from [`FieldReader::finish`].

use super::FieldError;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

/// Reads typed values out of a JSON object, collecting failures as it goes.
///
/// Accessors for required values return a placeholder when the value is missing
/// or malformed. The placeholder is never observable because `finish` fails in
/// that case.
#[derive(Debug)]
pub struct FieldReader<'a> {
    input: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(input: &'a Value) -> Result<Self, Vec<FieldError>> {
        match input.as_object() {
            Some(input) => Ok(Self {
                input,
                errors: Vec::new(),
            }),
            None => Err(vec![FieldError::new("body", "Request body must be a JSON object")]),
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.input.get(field).filter(|v| !v.is_null())
    }

    fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() && !self.errors.iter().any(|e| e.field == field) {
            self.errors
                .push(FieldError::new(field, format!("{} is required", field)));
        }
        value
    }

    fn invalid(&mut self, field: &str, message: String) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.present(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.invalid(field, format!("{} must be a string", field));
                None
            }
        }
    }

    pub fn required_str(&mut self, field: &str) -> String {
        let value = self.optional_str(field);
        self.require(field, value).unwrap_or_default()
    }

    /// A required string restricted to a fixed set of values.
    pub fn required_choice(&mut self, field: &str, allowed: &[&str]) -> String {
        let value = self.required_str(field);
        if !value.is_empty() && !allowed.contains(&value.as_str()) {
            self.invalid(
                field,
                format!("{} must be one of {}", field, allowed.join(", ")),
            );
        }
        value
    }

    /// Numbers may arrive as JSON numbers or numeric strings.
    pub fn optional_f64(&mut self, field: &str) -> Option<f64> {
        let parsed = match self.present(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };
        if parsed.is_none() {
            self.invalid(field, format!("{} must be a number", field));
        }
        parsed
    }

    pub fn required_f64(&mut self, field: &str) -> f64 {
        let value = self.optional_f64(field);
        self.require(field, value).unwrap_or_default()
    }

    pub fn optional_u32(&mut self, field: &str) -> Option<u32> {
        let number = self.optional_f64(field)?;
        if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
            self.invalid(field, format!("{} must be a non-negative whole number", field));
            return None;
        }
        Some(number as u32)
    }

    /// Dates are accepted as `YYYY-MM-DD` (midnight UTC) or RFC 3339.
    pub fn required_date(&mut self, field: &str) -> DateTime<Utc> {
        let raw = self.optional_str(field);
        let parsed = raw.as_deref().and_then(|raw| {
            let date = parse_date(raw);
            if date.is_none() {
                self.invalid(
                    field,
                    format!("{} must be a date (YYYY-MM-DD or RFC 3339)", field),
                );
            }
            date
        });
        self.require(field, parsed).unwrap_or_default()
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_all_missing_fields() {
        let input = json!({"name": "  ", "subject": null});
        let mut reader = FieldReader::new(&input).unwrap();
        reader.required_str("name");
        reader.required_str("email");
        reader.required_str("subject");

        let errors = reader.finish().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "subject"]);
        assert_eq!(errors[1].message, "email is required");
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let input = json!({"marks": 85, "totalMarks": "100", "bad": "lots", "experience": 4});
        let mut reader = FieldReader::new(&input).unwrap();
        assert_eq!(reader.required_f64("marks"), 85.0);
        assert_eq!(reader.required_f64("totalMarks"), 100.0);
        assert_eq!(reader.optional_u32("experience"), Some(4));
        reader.required_f64("bad");

        let errors = reader.finish().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("bad", "bad must be a number")]);
    }

    #[test]
    fn test_experience_must_be_whole_and_non_negative() {
        let input = json!({"a": -1, "b": 2.5});
        let mut reader = FieldReader::new(&input).unwrap();
        assert_eq!(reader.optional_u32("a"), None);
        assert_eq!(reader.optional_u32("b"), None);
        assert_eq!(reader.finish().unwrap_err().len(), 2);
    }

    #[test]
    fn test_choice() {
        let input = json!({"status": "late"});
        let mut reader = FieldReader::new(&input).unwrap();
        reader.required_choice("status", &["present", "absent"]);
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors[0].message, "status must be one of present, absent");
    }

    #[test]
    fn test_dates() {
        let day = parse_date("2024-01-15").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-01-15T00:00:00+00:00");

        let stamped = parse_date("2024-01-15T09:30:00+02:00").unwrap();
        assert_eq!(stamped.to_rfc3339(), "2024-01-15T07:30:00+00:00");

        assert!(parse_date("15/01/2024").is_none());

        let input = json!({"date": "yesterday"});
        let mut reader = FieldReader::new(&input).unwrap();
        reader.required_date("date");
        let errors = reader.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("must be a date"));
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert!(FieldReader::new(&json!([1, 2])).is_err());
    }
}
