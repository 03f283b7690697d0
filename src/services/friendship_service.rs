use crate::domain::friendship::{Decision, Friendship, PendingRequest, RespondOutcome};
use crate::domain::user::Profile;
use crate::error::{AppError, Result, is_unique_violation};
use crate::storage::DbPool;
use crate::storage::friendship_repo::FriendshipRepository;
use crate::storage::user_repo::UserRepository;
use opentelemetry::{KeyValue, global, metrics::Counter};

#[derive(Clone, Debug)]
struct Metrics {
    requests_total: Counter<u64>,
    responses_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            requests_total: meter
                .u64_counter("friend_requests_total")
                .with_description("Total friend request creation attempts")
                .build(),
            responses_total: meter
                .u64_counter("friend_request_responses_total")
                .with_description("Total friend request responses, by decision")
                .build(),
        }
    }
}

/// Owns the relationship lifecycle between two accounts. A pair is either
/// unrelated (no row), PENDING or ACCEPTED; rejection deletes the row, so a
/// rejected pair may be requested again later.
#[derive(Clone, Debug)]
pub struct FriendshipService {
    pool: DbPool,
    repo: FriendshipRepository,
    user_repo: UserRepository,
    metrics: Metrics,
}

impl FriendshipService {
    #[must_use]
    pub fn new(pool: DbPool, repo: FriendshipRepository, user_repo: UserRepository) -> Self {
        Self { pool, repo, user_repo, metrics: Metrics::new() }
    }

    /// Creates a PENDING request from `requester_id` to `addressee_id`.
    ///
    /// # Errors
    /// Returns `AppError::SelfRequest` when both ids are equal,
    /// `AppError::NotFound` when the addressee does not exist, and
    /// `AppError::DuplicateRequest` when any row already exists for the pair,
    /// in either direction and any status.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn send_request(&self, requester_id: i64, addressee_id: i64) -> Result<Friendship> {
        if requester_id == addressee_id {
            self.metrics.requests_total.add(1, &[KeyValue::new("outcome", "self")]);
            return Err(AppError::SelfRequest);
        }

        let mut conn = self.pool.acquire().await?;
        if !self.user_repo.exists(&mut conn, addressee_id).await? {
            return Err(AppError::NotFound);
        }

        match self.repo.create(&mut conn, requester_id, addressee_id).await {
            Ok(friendship) => {
                self.metrics.requests_total.add(1, &[KeyValue::new("outcome", "created")]);
                Ok(friendship)
            }
            Err(e) if is_unique_violation(&e) => {
                self.metrics.requests_total.add(1, &[KeyValue::new("outcome", "duplicate")]);
                Err(AppError::DuplicateRequest)
            }
            Err(e) => Err(e),
        }
    }

    /// Applies the addressee's decision to a pending request. ACCEPT keeps the
    /// row and returns it; REJECT deletes it, returning the pair to the
    /// unrelated state.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` for unknown requests,
    /// `AppError::NotAuthorized` when the responder is not the addressee, and
    /// `AppError::Conflict` when the request was already resolved.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn respond(&self, request_id: i64, responder_id: i64, decision: Decision) -> Result<RespondOutcome> {
        let mut tx = self.pool.begin().await?;

        let Some(friendship) = self.repo.find_by_id_for_update(&mut *tx, request_id).await? else {
            return Err(AppError::NotFound);
        };

        if friendship.addressee_id != responder_id {
            return Err(AppError::NotAuthorized("You are not authorized to update this request".into()));
        }

        if friendship.status != crate::domain::friendship::FriendshipStatus::Pending {
            return Err(AppError::Conflict("This request has already been resolved".into()));
        }

        let outcome = match decision {
            Decision::Accept => {
                let accepted = self.repo.accept(&mut *tx, request_id).await?;
                self.metrics.responses_total.add(1, &[KeyValue::new("decision", "accept")]);
                RespondOutcome::Accepted(accepted)
            }
            Decision::Reject => {
                self.repo.delete(&mut *tx, request_id).await?;
                self.metrics.responses_total.add(1, &[KeyValue::new("decision", "reject")]);
                RespondOutcome::Removed
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// The relationship row between two accounts, or `None` when the pair is
    /// unrelated. The row identifies which side initiated the request.
    pub async fn status_between(&self, user_a: i64, user_b: i64) -> Result<Option<Friendship>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.find_between(&mut conn, user_a, user_b).await
    }

    /// Public profiles of everyone connected to `user_id` through an ACCEPTED
    /// row, with the other party of each pair resolved.
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<Profile>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_friend_profiles(&mut conn, user_id).await
    }

    pub async fn list_incoming(&self, user_id: i64) -> Result<Vec<PendingRequest>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_incoming(&mut conn, user_id).await
    }

    pub async fn list_outgoing(&self, user_id: i64) -> Result<Vec<PendingRequest>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.list_outgoing(&mut conn, user_id).await
    }
}
