//! HTTP layer.
//!
//! Routes every `/api` endpoint onto the repositories in [`AppState`] and maps
//! their errors onto status codes through [`ApiError`]. The router is built without
//! binding a socket, so tests drive it with `tower::ServiceExt::oneshot`.
//!
//! # Routes
//!
//! | Path | Methods |
//! |---|---|
//! | `/api/test` | GET |
//! | `/api/auth/register`, `/api/auth/login` | POST |
//! | `/api/auth/me` | GET (bearer token) |
//! | `/api/students`, `/api/teachers` | GET, POST |
//! | `/api/students/:id`, `/api/teachers/:id` | GET, PUT, DELETE |
//! | `/api/attendance`, `/api/marks` | GET, POST |
//! | `/api/attendance/student/:studentId`, `/api/marks/student/:studentId` | GET |

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use handlers::{attendance, auth, health, marks, students, teachers};
use log::info;
use std::time::Instant;
use tower_http::cors::CorsLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Build the full application router.
pub fn router(state: AppState, cors_origin: HeaderValue) -> Router {
    Router::new()
        .route("/api/test", get(health::health))
        .nest("/api/auth", auth_routes())
        .nest("/api/students", student_routes())
        .nest("/api/teachers", teacher_routes())
        .nest("/api/attendance", attendance_routes())
        .nest("/api/marks", marks_routes())
        .fallback(health::route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::current_user))
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
}

fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(teachers::list_teachers).post(teachers::create_teacher),
        )
        .route(
            "/:id",
            get(teachers::get_teacher)
                .put(teachers::update_teacher)
                .delete(teachers::delete_teacher),
        )
}

fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(attendance::list_attendance).post(attendance::create_attendance),
        )
        .route(
            "/student/:student_id",
            get(attendance::attendance_for_student),
        )
}

fn marks_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(marks::list_marks).post(marks::create_marks))
        .route("/student/:student_id", get(marks::marks_for_student))
}

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} {} {}ms",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}
