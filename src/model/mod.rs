//! Record types persisted by the portal.
//!
//! All records serialize with camelCase JSON keys, which is the wire format of the
//! HTTP API and the document format inside the datastore.

pub mod attendance;
pub mod marks;
pub mod student;
pub mod teacher;
pub mod user;

pub use attendance::{Attendance, AttendanceStatus};
pub use marks::Marks;
pub use student::{DeletedStudent, Student, StudentFields, StudentStatus};
pub use teacher::Teacher;
pub use user::{LoginRequest, PublicUser, RegisterRequest, Role, User};
