use crate::domain::post::{AnnotatedPost, Post};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self { id: post.id, author_id: post.author_id, content: post.content, created_at: post.created_at }
    }
}

/// A post annotated for a reader. `is_liked_by_user` is omitted entirely for
/// anonymous viewers rather than defaulting to false.
#[derive(Debug, Serialize)]
pub struct AnnotatedPostResponse {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub likes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked_by_user: Option<bool>,
}

impl From<AnnotatedPost> for AnnotatedPostResponse {
    fn from(post: AnnotatedPost) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            author_name: post.author_name,
            author_avatar: post.author_avatar,
            content: post.content,
            created_at: post.created_at,
            likes_count: post.likes_count,
            is_liked_by_user: post.liked_by_viewer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeToggleResponse {
    pub message: &'static str,
}
