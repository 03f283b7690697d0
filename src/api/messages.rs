use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::messages::MessageResponse;
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

/// The caller's conversation with another account, oldest first.
pub async fn history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(other_user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let messages = state.message_service.history(auth_user.user_id, auth_user.user_id, other_user_id).await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect::<Vec<_>>()))
}
