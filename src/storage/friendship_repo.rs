use crate::domain::friendship::{Friendship, PendingRequest};
use crate::domain::user::Profile;
use crate::error::Result;
use crate::storage::records;
use sqlx::PgConnection;

#[derive(Clone, Debug, Default)]
pub struct FriendshipRepository;

impl FriendshipRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Inserts a PENDING row. The unordered-pair unique index rejects a second
    /// row for the same two accounts in either direction.
    pub async fn create(&self, conn: &mut PgConnection, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        let row = sqlx::query_as::<_, records::friendship::Friendship>(
            r"
            INSERT INTO friendships (requester_id, addressee_id, status)
            VALUES ($1, $2, 'PENDING')
            RETURNING id, requester_id, addressee_id, status, created_at
            ",
        )
        .bind(requester_id)
        .bind(addressee_id)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    /// Locks the row for the duration of the surrounding transaction.
    pub async fn find_by_id_for_update(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, records::friendship::Friendship>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at
            FROM friendships
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn find_between(&self, conn: &mut PgConnection, user_a: i64, user_b: i64) -> Result<Option<Friendship>> {
        let row = sqlx::query_as::<_, records::friendship::Friendship>(
            r"
            SELECT id, requester_id, addressee_id, status, created_at
            FROM friendships
            WHERE (requester_id = $1 AND addressee_id = $2)
               OR (requester_id = $2 AND addressee_id = $1)
            ",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn accept(&self, conn: &mut PgConnection, id: i64) -> Result<Friendship> {
        let row = sqlx::query_as::<_, records::friendship::Friendship>(
            r"
            UPDATE friendships
            SET status = 'ACCEPTED'
            WHERE id = $1
            RETURNING id, requester_id, addressee_id, status, created_at
            ",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(row.into())
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM friendships WHERE id = $1").bind(id).execute(conn).await?;
        Ok(())
    }

    /// Accepted counterparts of `user_id`, resolved to the *other* side of each row.
    pub async fn list_friend_profiles(&self, conn: &mut PgConnection, user_id: i64) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, records::user::Profile>(
            r"
            SELECT u.id, u.name, u.avatar
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.requester_id = $1 THEN f.addressee_id ELSE f.requester_id END
            WHERE f.status = 'ACCEPTED'
              AND (f.requester_id = $1 OR f.addressee_id = $1)
            ORDER BY u.id
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn friend_ids(&self, conn: &mut PgConnection, user_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r"
            SELECT CASE WHEN requester_id = $1 THEN addressee_id ELSE requester_id END
            FROM friendships
            WHERE status = 'ACCEPTED'
              AND (requester_id = $1 OR addressee_id = $1)
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    pub async fn list_incoming(&self, conn: &mut PgConnection, user_id: i64) -> Result<Vec<PendingRequest>> {
        let rows = sqlx::query_as::<_, records::friendship::PendingRequest>(
            r"
            SELECT f.id, f.requester_id, f.addressee_id, f.status, f.created_at,
                   u.id AS peer_id, u.name AS peer_name, u.avatar AS peer_avatar
            FROM friendships f
            JOIN users u ON u.id = f.requester_id
            WHERE f.addressee_id = $1 AND f.status = 'PENDING'
            ORDER BY f.created_at DESC, f.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_outgoing(&self, conn: &mut PgConnection, user_id: i64) -> Result<Vec<PendingRequest>> {
        let rows = sqlx::query_as::<_, records::friendship::PendingRequest>(
            r"
            SELECT f.id, f.requester_id, f.addressee_id, f.status, f.created_at,
                   u.id AS peer_id, u.name AS peer_name, u.avatar AS peer_avatar
            FROM friendships f
            JOIN users u ON u.id = f.addressee_id
            WHERE f.requester_id = $1 AND f.status = 'PENDING'
            ORDER BY f.created_at DESC, f.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
