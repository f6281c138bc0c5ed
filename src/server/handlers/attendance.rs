use crate::model::Attendance;
use crate::server::{ApiResult, AppState};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

pub async fn list_attendance(State(state): State<AppState>) -> ApiResult<Json<Vec<Attendance>>> {
    let records = state
        .attendance
        .list()
        .await
        .map_err(state.fail("Failed to fetch attendance"))?;
    Ok(Json(records))
}

pub async fn create_attendance(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Attendance>)> {
    let Json(input) = payload?;
    let record = state
        .attendance
        .create(&input)
        .await
        .map_err(state.fail("Failed to record attendance"))?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn attendance_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let records = state
        .attendance
        .list_by_student(&student_id)
        .await
        .map_err(state.fail("Failed to fetch attendance"))?;
    Ok(Json(records))
}
