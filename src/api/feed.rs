use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::posts::AnnotatedPostResponse;
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

/// The viewer's friend feed: accepted friends' posts, newest first.
pub async fn feed(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let posts = state.feed_service.feed_for(auth_user.user_id).await?;
    Ok(Json(posts.into_iter().map(AnnotatedPostResponse::from).collect::<Vec<_>>()))
}
