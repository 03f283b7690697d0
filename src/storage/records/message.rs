use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl From<Message> for crate::domain::message::Message {
    fn from(record: Message) -> Self {
        Self {
            id: record.id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            content: record.content,
            created_at: record.created_at,
        }
    }
}
