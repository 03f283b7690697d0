use crate::api::AppState;
use crate::api::schemas::auth::{AuthResponse, CheckEmail, EmailExists, Login, Registration};
use crate::api::schemas::users::UserResponse;
use crate::error::Result;
use crate::services::account_service;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Creates an account and returns its public view.
///
/// # Errors
/// Returns `AppError::Conflict` when the email is taken.
pub async fn register(State(state): State<AppState>, Json(payload): Json<Registration>) -> Result<impl IntoResponse> {
    let user = state
        .account_service
        .register(account_service::Registration {
            name: payload.name,
            email: payload.email,
            age: payload.age,
            description: payload.description,
            avatar: payload.avatar,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(State(state): State<AppState>, Json(payload): Json<Login>) -> Result<impl IntoResponse> {
    let session = state.account_service.login(&payload.email, &payload.password).await?;
    Ok(Json(AuthResponse { token: session.token.as_str().to_string(), expires_at: session.expires_at }))
}

pub async fn check_email(State(state): State<AppState>, Json(payload): Json<CheckEmail>) -> Result<impl IntoResponse> {
    let exists = state.account_service.email_exists(&payload.email).await?;
    Ok(Json(EmailExists { exists }))
}
