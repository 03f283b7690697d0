use crate::domain::post::{AnnotatedPost, Post};
use crate::error::Result;
use crate::storage::records;
use sqlx::PgConnection;

#[derive(Clone, Debug, Default)]
pub struct PostRepository;

impl PostRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub async fn create(&self, conn: &mut PgConnection, author_id: i64, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, records::post::Post>(
            r"
            INSERT INTO posts (author_id, content)
            VALUES ($1, $2)
            RETURNING id, author_id, content, created_at
            ",
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(conn)
        .await?;

        Ok(post.into())
    }

    pub async fn exists(&self, conn: &mut PgConnection, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await?;

        Ok(exists)
    }

    /// Posts authored by any of `author_ids`, newest first, annotated with
    /// like counts and the viewer's own like flag.
    pub async fn annotated_by_authors(
        &self,
        conn: &mut PgConnection,
        author_ids: &[i64],
        viewer_id: i64,
    ) -> Result<Vec<AnnotatedPost>> {
        let posts = sqlx::query_as::<_, records::post::AnnotatedPost>(
            r"
            SELECT p.id, p.author_id, u.name AS author_name, u.avatar AS author_avatar,
                   p.content, p.created_at,
                   (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
                   EXISTS (SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $2) AS liked_by_viewer
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = ANY($1)
            ORDER BY p.created_at DESC, p.id DESC
            ",
        )
        .bind(author_ids)
        .bind(viewer_id)
        .fetch_all(conn)
        .await?;

        Ok(posts.into_iter().map(Into::into).collect())
    }

    /// One author's posts, newest first. The personal like flag is NULL for
    /// anonymous viewers rather than a guessed false.
    pub async fn annotated_by_author(
        &self,
        conn: &mut PgConnection,
        author_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<AnnotatedPost>> {
        let posts = sqlx::query_as::<_, records::post::AnnotatedPost>(
            r"
            SELECT p.id, p.author_id, u.name AS author_name, u.avatar AS author_avatar,
                   p.content, p.created_at,
                   (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
                   CASE WHEN $2::BIGINT IS NULL THEN NULL
                        ELSE EXISTS (SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $2)
                   END AS liked_by_viewer
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            ",
        )
        .bind(author_id)
        .bind(viewer_id)
        .fetch_all(conn)
        .await?;

        Ok(posts.into_iter().map(Into::into).collect())
    }

    /// Inserts a like; returns false when the pair already existed.
    pub async fn insert_like(&self, conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            ",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a like; returns false when no pair existed.
    pub async fn delete_like(&self, conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn like_exists(&self, conn: &mut PgConnection, post_id: i64, user_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM likes WHERE post_id = $1 AND user_id = $2)")
                .bind(post_id)
                .bind(user_id)
                .fetch_one(conn)
                .await?;

        Ok(exists)
    }
}
