use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct User {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) age: Option<i32>,
    pub(crate) description: Option<String>,
    pub(crate) avatar: String,
    pub(crate) password_hash: String,
    pub(crate) created_at: OffsetDateTime,
}

/// The subset of an account that other users may see.
#[derive(Debug, Clone)]
pub struct Profile {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) avatar: String,
}
