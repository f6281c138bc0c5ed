use crate::model::Teacher;
use crate::server::{ApiError, ApiResult, AppState};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

pub async fn list_teachers(State(state): State<AppState>) -> ApiResult<Json<Vec<Teacher>>> {
    let teachers = state
        .teachers
        .list()
        .await
        .map_err(state.fail("Failed to fetch teachers"))?;
    Ok(Json(teachers))
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Teacher>> {
    state
        .teachers
        .get(&id)
        .await
        .map_err(state.fail("Failed to fetch teacher"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Teacher not found"))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Teacher>)> {
    let Json(input) = payload?;
    let teacher = state
        .teachers
        .create(&input)
        .await
        .map_err(state.fail("Failed to create teacher"))?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = payload?;
    let teacher = state
        .teachers
        .update(&id, &input)
        .await
        .map_err(state.fail("Failed to update teacher"))?;
    Ok(Json(json!({
        "message": "Teacher updated successfully",
        "teacher": teacher,
    })))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .teachers
        .delete(&id)
        .await
        .map_err(state.fail("Failed to delete teacher"))?;
    Ok(Json(json!({ "message": "Teacher deleted successfully" })))
}
