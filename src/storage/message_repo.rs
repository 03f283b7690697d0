use crate::domain::message::Message;
use crate::error::Result;
use crate::storage::records;
use sqlx::PgConnection;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository;

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, records::message::Message>(
            r"
            INSERT INTO messages (sender_id, receiver_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, receiver_id, content, created_at
            ",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(conn)
        .await?;

        Ok(message.into())
    }

    /// Full conversation between two accounts, both directions, oldest first.
    pub async fn history_between(&self, conn: &mut PgConnection, user_a: i64, user_b: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, records::message::Message>(
            r"
            SELECT id, sender_id, receiver_id, content, created_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(conn)
        .await?;

        Ok(messages.into_iter().map(Into::into).collect())
    }
}
