use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keyward_core::error::CoreError;
use keyward_core::token::TokenError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `keyward_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<keyward_db::StoreError> for AppError {
    fn from(err: keyward_db::StoreError) -> Self {
        AppError::Core(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::AuthenticationFailed => (
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_FAILED",
            err.to_string(),
        ),
        CoreError::Token(token) => {
            let code = match token {
                TokenError::Malformed => "MALFORMED_TOKEN",
                TokenError::Expired => "EXPIRED_TOKEN",
                TokenError::WrongKind { .. } => "WRONG_TOKEN_KIND",
            };
            (StatusCode::UNAUTHORIZED, code, err.to_string())
        }
        CoreError::SessionInvalid => {
            (StatusCode::UNAUTHORIZED, "SESSION_INVALID", err.to_string())
        }
        CoreError::Rejected(rejection) => (
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            rejection.to_string(),
        ),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::NotImplemented(op) => (
            StatusCode::NOT_IMPLEMENTED,
            "NOT_IMPLEMENTED",
            format!("{op} is not supported by this deployment"),
        ),
        CoreError::Configuration(msg) | CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
