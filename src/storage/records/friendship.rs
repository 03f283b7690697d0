use crate::domain::friendship::FriendshipStatus;
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct Friendship {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl From<Friendship> for crate::domain::friendship::Friendship {
    fn from(record: Friendship) -> Self {
        let status = FriendshipStatus::parse(&record.status).unwrap_or_else(|| {
            tracing::error!(status = %record.status, "Unknown friendship status in storage");
            FriendshipStatus::Pending
        });
        Self {
            id: record.id,
            requester_id: record.requester_id,
            addressee_id: record.addressee_id,
            status,
            created_at: record.created_at,
        }
    }
}

/// A pending request joined with the counterpart's public profile.
#[derive(sqlx::FromRow)]
pub(crate) struct PendingRequest {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub peer_id: i64,
    pub peer_name: String,
    pub peer_avatar: String,
}

impl From<PendingRequest> for crate::domain::friendship::PendingRequest {
    fn from(record: PendingRequest) -> Self {
        Self {
            friendship: crate::domain::friendship::Friendship::from(Friendship {
                id: record.id,
                requester_id: record.requester_id,
                addressee_id: record.addressee_id,
                status: record.status,
                created_at: record.created_at,
            }),
            peer: crate::domain::user::Profile {
                id: record.peer_id,
                name: record.peer_name,
                avatar: record.peer_avatar,
            },
        }
    }
}
