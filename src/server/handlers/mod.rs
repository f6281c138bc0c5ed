//! Request handlers, one module per resource.

pub mod attendance;
pub mod auth;
pub mod health;
pub mod marks;
pub mod students;
pub mod teachers;
