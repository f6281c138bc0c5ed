//! Demo data for in-memory mode.
//!
//! Seeds the accounts, students, teacher and sample attendance/marks that the
//! portal's frontend expects when no database is configured. All demo accounts use
//! the password [`DEMO_PASSWORD`].

use crate::auth::hash_password;
use crate::error::PortalResult;
use crate::model::{Role, StudentFields, User};
use crate::server::AppState;
use log::info;
use serde_json::json;

pub const DEMO_PASSWORD: &str = "password";

/// Counts of what [`seed`] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub students: usize,
    pub teachers: usize,
    pub attendance: usize,
    pub marks: usize,
}

/// Populate an empty datastore with demo records.
pub async fn seed(state: &AppState) -> PortalResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let accounts = [
        ("admin", "admin@school.com", Role::Admin, "Admin User"),
        ("teacher1", "teacher@school.com", Role::Teacher, "John Teacher"),
        ("student1", "student@school.com", Role::Student, "Jane Student"),
    ];
    for (username, email, role, name) in accounts {
        state
            .auth
            .insert_user(User {
                id: uuid::Uuid::new_v4().to_string(),
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(DEMO_PASSWORD),
                role,
                name: name.to_string(),
            })
            .await?;
        summary.users += 1;
    }

    let jane = state
        .students
        .create(StudentFields::new("Jane Student", "student@school.com", "001", "10A"))
        .await?;
    state
        .students
        .create(StudentFields::new("John Doe", "john@school.com", "002", "10B"))
        .await?;
    summary.students = 2;

    let teacher = state
        .teachers
        .create(&json!({
            "name": "John Teacher",
            "email": "teacher@school.com",
            "subject": "Mathematics"
        }))
        .await?;
    summary.teachers = 1;

    let students = state.students.list().await?;
    for student in &students {
        let status = if student.id == jane.id { "present" } else { "absent" };
        state
            .attendance
            .create(&json!({
                "studentId": student.id,
                "date": "2024-01-15",
                "subject": "Mathematics",
                "status": status,
                "teacherId": teacher.id
            }))
            .await?;
        summary.attendance += 1;
    }

    for (subject, score) in [("Mathematics", 85), ("Science", 92)] {
        state
            .marks
            .create(&json!({
                "studentId": jane.id,
                "subject": subject,
                "examType": "Midterm",
                "marks": score,
                "totalMarks": 100
            }))
            .await?;
        summary.marks += 1;
    }

    info!(
        "Seeded demo data: {} users, {} students, {} teachers, {} attendance, {} marks",
        summary.users, summary.students, summary.teachers, summary.attendance, summary.marks
    );
    info!(
        "Demo credentials: admin@school.com, teacher@school.com, student@school.com / {}",
        DEMO_PASSWORD
    );
    Ok(summary)
}
