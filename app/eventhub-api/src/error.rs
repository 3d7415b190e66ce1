//! API Error Types
//!
//! Every handler returns `ApiResult<T>`; `ApiError` renders the same
//! `{ success, message, errors? }` envelope as the auth routes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventhub_auth::{error::field_errors, ApiResponse, AuthError};
use std::sync::atomic::{AtomicBool, Ordering};
use validator::ValidationErrors;

pub type ApiResult<T> = Result<T, ApiError>;

static REDACT_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Hide internal error detail from clients (production mode)
pub fn redact_internal_errors(redact: bool) {
    REDACT_INTERNAL.store(redact, Ordering::Relaxed);
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation Error")]
    Validation(Vec<serde_json::Value>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ApiResponse::error("Validation Error", Some(errors)),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "Request failed");
                let message = if REDACT_INTERNAL.load(Ordering::Relaxed) {
                    "Internal Server Error".to_string()
                } else {
                    detail
                };
                ApiResponse::error(message, None)
            }
            other => ApiResponse::error(other.to_string(), None),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Unauthorized | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            AuthError::EmailExists => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword => ApiError::BadRequest(err.to_string()),
            AuthError::BadRequest(msg) => ApiError::BadRequest(msg),
            AuthError::Validation(errors) => ApiError::Validation(field_errors(&errors)),
            AuthError::Database(detail) | AuthError::Config(detail) => ApiError::Internal(detail),
            AuthError::Internal => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => {
                    tracing::debug!("Unique violation: {}", db.message());
                    ApiError::Conflict("Resource already exists".to_string())
                }
                Some("22P02") => ApiError::BadRequest("Invalid ID format".to_string()),
                Some("23514") | Some("23503") => ApiError::BadRequest(db.message().to_string()),
                _ => {
                    tracing::error!("Database error: {:?}", err);
                    ApiError::Internal(err.to_string())
                }
            },
            _ => {
                tracing::error!("Database error: {:?}", err);
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Path rejected: {}", rejection.body_text());
        ApiError::BadRequest("Invalid ID format".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
