use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct Post {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl From<Post> for crate::domain::post::Post {
    fn from(record: Post) -> Self {
        Self { id: record.id, author_id: record.author_id, content: record.content, created_at: record.created_at }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AnnotatedPost {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub likes_count: i64,
    pub liked_by_viewer: Option<bool>,
}

impl From<AnnotatedPost> for crate::domain::post::AnnotatedPost {
    fn from(record: AnnotatedPost) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            author_name: record.author_name,
            author_avatar: record.author_avatar,
            content: record.content,
            created_at: record.created_at,
            likes_count: record.likes_count,
            liked_by_viewer: record.liked_by_viewer,
        }
    }
}
