use crate::domain::user::{Profile, User};
use crate::error::Result;
use crate::storage::records;
use sqlx::PgConnection;

#[derive(Clone, Debug, Default)]
pub struct UserRepository;

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        name: &str,
        email: &str,
        age: Option<i32>,
        description: Option<&str>,
        avatar: &str,
        password_hash: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, records::user::User>(
            r"
            INSERT INTO users (name, email, age, description, avatar, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, age, description, avatar, password_hash, created_at
            ",
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(description)
        .bind(avatar)
        .bind(password_hash)
        .fetch_one(conn)
        .await?;

        Ok(user.into())
    }

    pub async fn find_by_id(&self, conn: &mut PgConnection, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, records::user::User>(
            r"
            SELECT id, name, email, age, description, avatar, password_hash, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user.map(Into::into))
    }

    pub async fn find_by_email(&self, conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, records::user::User>(
            r"
            SELECT id, name, email, age, description, avatar, password_hash, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(user.map(Into::into))
    }

    pub async fn list_all(&self, conn: &mut PgConnection) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, records::user::User>(
            r"
            SELECT id, name, email, age, description, avatar, password_hash, created_at
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(conn)
        .await?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Updates the owner-editable profile fields; absent fields keep their value.
    pub async fn update_profile(
        &self,
        conn: &mut PgConnection,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, records::user::User>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                avatar = COALESCE($4, avatar)
            WHERE id = $1
            RETURNING id, name, email, age, description, avatar, password_hash, created_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(avatar)
        .fetch_optional(conn)
        .await?;

        Ok(user.map(Into::into))
    }

    pub async fn exists(&self, conn: &mut PgConnection, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await?;

        Ok(exists)
    }

    pub async fn email_exists(&self, conn: &mut PgConnection, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(conn)
            .await?;

        Ok(exists)
    }

    pub async fn profile(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, records::user::Profile>(
            r"
            SELECT id, name, avatar
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(profile.map(Into::into))
    }
}
