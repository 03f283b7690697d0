use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) content: String,
    pub(crate) created_at: OffsetDateTime,
}

/// A post as seen by a reader: author attribution plus like state.
/// `liked_by_viewer` is `None` when no viewer identity was available,
/// never a guess.
#[derive(Debug, Clone)]
pub struct AnnotatedPost {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) author_avatar: String,
    pub(crate) content: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) likes_count: i64,
    pub(crate) liked_by_viewer: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}
