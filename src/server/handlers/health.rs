use crate::server::{ApiError, AppState};
use axum::Json;
use axum::extract::{OriginalUri, State};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Backend is running!",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "datastore": state.datastore(),
    }))
}

pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
