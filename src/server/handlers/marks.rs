use crate::model::Marks;
use crate::server::{ApiResult, AppState};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

pub async fn list_marks(State(state): State<AppState>) -> ApiResult<Json<Vec<Marks>>> {
    let records = state
        .marks
        .list()
        .await
        .map_err(state.fail("Failed to fetch marks"))?;
    Ok(Json(records))
}

pub async fn create_marks(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Marks>)> {
    let Json(input) = payload?;
    let record = state
        .marks
        .create(&input)
        .await
        .map_err(state.fail("Failed to record marks"))?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn marks_for_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<Marks>>> {
    let records = state
        .marks
        .list_by_student(&student_id)
        .await
        .map_err(state.fail("Failed to fetch marks"))?;
    Ok(Json(records))
}
