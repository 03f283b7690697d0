use crate::api::AppState;
use crate::api::middleware::{AuthUser, OptionalAuthUser};
use crate::api::schemas::posts::{AnnotatedPostResponse, CreatePost, LikeToggleResponse, PostResponse};
use crate::domain::post::LikeToggle;
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePost>,
) -> Result<impl IntoResponse> {
    let post = state.post_service.create(auth_user.user_id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// One author's posts. Anonymous viewers get like counts but no personal
/// like flag.
pub async fn user_posts(
    OptionalAuthUser(viewer_id): OptionalAuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let posts = state.feed_service.posts_for(user_id, viewer_id).await?;
    Ok(Json(posts.into_iter().map(AnnotatedPostResponse::from).collect::<Vec<_>>()))
}

pub async fn toggle_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let toggle = state.post_service.toggle_like(post_id, auth_user.user_id).await?;
    let message = match toggle {
        LikeToggle::Liked => "Post liked",
        LikeToggle::Unliked => "Post unliked",
    };
    Ok(Json(LikeToggleResponse { message }))
}
