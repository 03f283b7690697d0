use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Authentication failed")]
    AuthError,
    #[error("Not found")]
    NotFound,
    #[error("You cannot send a friend request to yourself")]
    SelfRequest,
    #[error("A relationship between these accounts already exists")]
    DuplicateRequest,
    #[error("Not authorized: {0}")]
    NotAuthorized(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            Self::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            Self::SelfRequest => {
                tracing::debug!("Self friend request rejected");
                (StatusCode::BAD_REQUEST, "You cannot send a friend request to yourself".to_string())
            }
            Self::DuplicateRequest => {
                tracing::debug!("Duplicate friend request rejected");
                (StatusCode::CONFLICT, "A relationship between these accounts already exists".to_string())
            }
            Self::NotAuthorized(msg) => {
                tracing::debug!(message = %msg, "Not authorized");
                (StatusCode::FORBIDDEN, msg)
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                (StatusCode::CONFLICT, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// True when the error is a Postgres unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &AppError) -> bool {
    if let AppError::Database(sqlx::Error::Database(db_err)) = err {
        return db_err.code().as_deref() == Some("23505");
    }
    false
}
