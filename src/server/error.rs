use crate::auth::AuthError;
use crate::providers::ProviderError;
use crate::validation::FieldError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

/// Detail shown instead of the real cause when errors are not exposed.
pub const GENERIC_DETAIL: &str = "Something went wrong";

/// An error response: status plus the `{message, errors?, error?}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Option<Vec<String>>,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 400 listing every failed rule.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors.into_iter().map(|e| e.message).collect()),
            ..Self::bad_request("Validation failed")
        }
    }

    /// 500 naming the failed action. `detail` reaches the client only when
    /// `expose` is set.
    pub fn internal(action: impl Into<String>, detail: impl Into<String>, expose: bool) -> Self {
        let action = action.into();
        let detail = detail.into();
        error!("{}: {}", action, detail);
        Self {
            detail: Some(if expose {
                detail
            } else {
                GENERIC_DETAIL.to_string()
            }),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, action)
        }
    }

    /// Map a repository error; `action` names the request for 500 responses.
    pub fn from_provider(error: ProviderError, action: &str, expose: bool) -> Self {
        match error {
            ProviderError::InvalidInput { errors } => Self::validation(errors),
            ProviderError::Duplicate { message, .. } => Self::bad_request(message),
            ProviderError::NotFound { resource_type, .. } => {
                Self::not_found(format!("{} not found", resource_type))
            }
            ProviderError::Storage { message } | ProviderError::Internal { message } => {
                Self::internal(action, message, expose)
            }
        }
    }

    pub fn from_auth(error: AuthError, expose: bool) -> Self {
        match error {
            AuthError::InvalidInput { errors } => Self::validation(errors),
            AuthError::UserExists => Self::bad_request(error.to_string()),
            AuthError::InvalidCredentials => Self::unauthorized(error.to_string()),
            AuthError::InvalidToken(reason) => {
                warn!("Rejected token: {}", reason);
                Self::unauthorized("Invalid token")
            }
            AuthError::Token(detail) | AuthError::Storage(detail) => {
                Self::internal("Server error", detail, expose)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            errors: self.errors,
            error: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
