use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::users::{ProfileUpdate, UserResponse};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.account_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect::<Vec<_>>()))
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> Result<impl IntoResponse> {
    let user = state.account_service.get_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Updates profile fields; only the owner may edit their own profile.
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<impl IntoResponse> {
    let user = state
        .account_service
        .update_profile(
            auth_user.user_id,
            user_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.avatar.as_deref(),
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}
