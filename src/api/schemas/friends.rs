use crate::api::schemas::users::ProfileResponse;
use crate::domain::friendship::{Friendship, PendingRequest};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct FriendRequestCreate {
    pub addressee_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct FriendshipResponse {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Friendship> for FriendshipResponse {
    fn from(friendship: Friendship) -> Self {
        Self {
            id: friendship.id,
            requester_id: friendship.requester_id,
            addressee_id: friendship.addressee_id,
            status: friendship.status.as_str(),
            created_at: friendship.created_at,
        }
    }
}

/// Either the relationship row or the derived unrelated marker. The row keeps
/// requester/addressee so a caller can tell "sent by me" from "sent to me".
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FriendshipStatusResponse {
    Related(FriendshipResponse),
    NotFriends { status: &'static str },
}

impl From<Option<Friendship>> for FriendshipStatusResponse {
    fn from(friendship: Option<Friendship>) -> Self {
        friendship.map_or(Self::NotFriends { status: "NOT_FRIENDS" }, |f| Self::Related(f.into()))
    }
}

#[derive(Debug, Serialize)]
pub struct PendingRequestResponse {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<ProfileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addressee: Option<ProfileResponse>,
}

impl PendingRequestResponse {
    /// Incoming view: the counterpart is the requester.
    #[must_use]
    pub fn incoming(request: PendingRequest) -> Self {
        Self::build(request, true)
    }

    /// Outgoing view: the counterpart is the addressee.
    #[must_use]
    pub fn outgoing(request: PendingRequest) -> Self {
        Self::build(request, false)
    }

    fn build(request: PendingRequest, peer_is_requester: bool) -> Self {
        let peer = ProfileResponse::from(request.peer);
        let (requester, addressee) = if peer_is_requester { (Some(peer), None) } else { (None, Some(peer)) };
        Self {
            id: request.friendship.id,
            requester_id: request.friendship.requester_id,
            addressee_id: request.friendship.addressee_id,
            status: request.friendship.status.as_str(),
            created_at: request.friendship.created_at,
            requester,
            addressee,
        }
    }
}
