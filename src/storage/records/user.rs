use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub avatar: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl From<User> for crate::domain::user::User {
    fn from(record: User) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            age: record.age,
            description: record.description,
            avatar: record.avatar,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct Profile {
    pub id: i64,
    pub name: String,
    pub avatar: String,
}

impl From<Profile> for crate::domain::user::Profile {
    fn from(record: Profile) -> Self {
        Self { id: record.id, name: record.name, avatar: record.avatar }
    }
}
