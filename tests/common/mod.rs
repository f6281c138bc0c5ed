//! Shared fixtures for the integration tests.
//!
//! Each helper builds a fresh, isolated datastore so tests never share records.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Request, StatusCode, header};
use school_portal::auth::TokenIssuer;
use school_portal::model::StudentFields;
use school_portal::providers::StudentRepository;
use school_portal::server::{self, AppState};
use school_portal::storage::{Datastore, InMemoryStorage, SqliteStorage};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const FRONTEND_ORIGIN: &str = "http://localhost:3000";

pub fn memory_datastore() -> Datastore {
    Datastore::Memory(InMemoryStorage::new())
}

pub async fn sqlite_datastore() -> Datastore {
    Datastore::Sqlite(
        SqliteStorage::new_in_memory()
            .await
            .expect("in-memory SQLite should open"),
    )
}

/// Both backends, labelled for assertion messages.
pub async fn all_datastores() -> Vec<(&'static str, Datastore)> {
    vec![
        ("memory", memory_datastore()),
        ("sqlite", sqlite_datastore().await),
    ]
}

pub async fn student_repository(datastore: Datastore) -> StudentRepository<Datastore> {
    StudentRepository::new(datastore)
        .await
        .expect("indexes should be created")
}

pub async fn app_state(datastore: Datastore) -> AppState {
    AppState::new(datastore, TokenIssuer::new(TEST_SECRET), true)
        .await
        .expect("state should build")
}

pub async fn app() -> Router {
    let state = app_state(memory_datastore()).await;
    server::router(state, HeaderValue::from_static(FRONTEND_ORIGIN))
}

/// The student from the README walkthrough, before normalization.
pub fn jane_doe() -> StudentFields {
    StudentFields::new("  Jane Doe ", "Jane@X.com", "r001", "10A")
}

pub fn student(n: u32) -> StudentFields {
    StudentFields::new(
        format!("Student {}", n),
        format!("student{}@school.com", n),
        format!("R{:03}", n),
        "10A",
    )
}

/// Send one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(&body.to_string()), None).await
}

pub async fn put(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(&body.to_string()), None).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None, None).await
}

/// The `errors` array of a validation response as plain strings.
pub fn error_messages(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
