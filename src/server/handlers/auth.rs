use crate::auth::AuthResponse;
use crate::model::{LoginRequest, PublicUser, RegisterRequest};
use crate::server::{ApiError, ApiResult, AppState};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use serde_json::{Value, json};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let response = state
        .auth
        .register(request)
        .await
        .map_err(|e| ApiError::from_auth(e, state.expose_errors()))?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = state
        .auth
        .login(request)
        .await
        .map_err(|e| ApiError::from_auth(e, state.expose_errors()))?;
    Ok(Json(response))
}

/// The account behind the bearer token.
pub async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing token"))?;
    let claims = state
        .auth
        .verify_token(token)
        .map_err(|e| ApiError::from_auth(e, state.expose_errors()))?;
    let user = state
        .auth
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| ApiError::from_auth(e, state.expose_errors()))?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;
    Ok(Json(json!({ "user": PublicUser::from(&user) })))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
