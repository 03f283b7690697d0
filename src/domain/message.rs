use time::OffsetDateTime;

/// A direct message. Immutable once created; ordering key is
/// `(created_at, id)`.
#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) id: i64,
    pub(crate) sender_id: i64,
    pub(crate) receiver_id: i64,
    pub(crate) content: String,
    pub(crate) created_at: OffsetDateTime,
}
