use crate::model::{Student, StudentFields};
use crate::server::{ApiError, ApiResult, AppState};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    let students = state
        .students
        .list()
        .await
        .map_err(state.fail("Failed to fetch students"))?;
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Student>> {
    state
        .students
        .get(&id)
        .await
        .map_err(state.fail("Failed to fetch student"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentFields>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let Json(fields) = payload?;
    let student = state
        .students
        .create(fields)
        .await
        .map_err(state.fail("Failed to create student"))?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentFields>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(fields) = payload?;
    let student = state
        .students
        .update(&id, fields)
        .await
        .map_err(state.fail("Failed to update student"))?;
    Ok(Json(json!({
        "message": "Student updated successfully",
        "student": student,
    })))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .students
        .delete(&id)
        .await
        .map_err(state.fail("Failed to delete student"))?;
    Ok(Json(json!({
        "message": "Student deleted successfully",
        "deletedStudent": deleted,
    })))
}
