use crate::domain::user::Profile;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    #[must_use]
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACCEPTED" => Some(Self::Accepted),
            _ => None,
        }
    }
}

/// A relationship row. Absence of a row means the pair is not related;
/// rejection deletes the row rather than storing a terminal state.
#[derive(Debug, Clone)]
pub struct Friendship {
    pub(crate) id: i64,
    pub(crate) requester_id: i64,
    pub(crate) addressee_id: i64,
    pub(crate) status: FriendshipStatus,
    pub(crate) created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub enum RespondOutcome {
    Accepted(Friendship),
    Removed,
}

/// A pending request together with the counterpart's public profile.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub(crate) friendship: Friendship,
    pub(crate) peer: Profile,
}
