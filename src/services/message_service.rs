use crate::domain::message::Message;
use crate::error::{AppError, Result};
use crate::services::gateway::protocol::GatewayEvent;
use crate::services::presence::PresenceRegistry;
use crate::storage::DbPool;
use crate::storage::message_repo::MessageRepository;
use crate::storage::user_repo::UserRepository;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    pushed_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            sent_total: meter
                .u64_counter("messages_sent_total")
                .with_description("Total message send attempts")
                .build(),
            pushed_total: meter
                .u64_counter("messages_pushed_total")
                .with_description("Live push attempts after persistence, by outcome")
                .build(),
        }
    }
}

/// Persists direct messages, then attempts best-effort live delivery through
/// the presence registry. The stored row is the source of truth; a missing or
/// broken recipient connection never fails a send.
#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    repo: MessageRepository,
    user_repo: UserRepository,
    presence: Arc<PresenceRegistry>,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        repo: MessageRepository,
        user_repo: UserRepository,
        presence: Arc<PresenceRegistry>,
    ) -> Self {
        Self { pool, repo, user_repo, presence, metrics: Metrics::new() }
    }

    /// Stores a message and pushes it to the recipient's live connection when
    /// one is registered. Returns the persisted message either way.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for empty content,
    /// `AppError::NotFound` for an unknown recipient, and
    /// `AppError::Database` if the message cannot be stored.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, content),
        fields(receiver_id = %receiver_id)
    )]
    pub async fn send(&self, sender_id: i64, receiver_id: i64, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest("Message content cannot be empty".into()));
        }

        let mut conn = self.pool.acquire().await?;
        if !self.user_repo.exists(&mut conn, receiver_id).await? {
            return Err(AppError::NotFound);
        }

        let message = match self.repo.create(&mut conn, sender_id, receiver_id, content).await {
            Ok(message) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "success")]);
                message
            }
            Err(e) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "failure")]);
                return Err(e);
            }
        };

        // Delivery is opportunistic: the recipient either has a live
        // connection right now or will see the message on its next history
        // fetch. Push failures are absorbed here and never reach the sender.
        match self.presence.lookup(receiver_id) {
            Some(handle) => {
                if handle.push(GatewayEvent::message(&message)) {
                    self.metrics.pushed_total.add(1, &[KeyValue::new("outcome", "delivered")]);
                } else {
                    tracing::debug!(message_id = message.id, "Live push failed, recipient connection gone");
                    self.metrics.pushed_total.add(1, &[KeyValue::new("outcome", "failed")]);
                }
            }
            None => {
                self.metrics.pushed_total.add(1, &[KeyValue::new("outcome", "offline")]);
            }
        }

        Ok(message)
    }

    /// Conversation between `user_a` and `user_b`, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::NotAuthorized` unless the caller is one of the two
    /// participants.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn history(&self, caller_id: i64, user_a: i64, user_b: i64) -> Result<Vec<Message>> {
        if caller_id != user_a && caller_id != user_b {
            return Err(AppError::NotAuthorized("Only a participant may read this conversation".into()));
        }

        let mut conn = self.pool.acquire().await?;
        self.repo.history_between(&mut conn, user_a, user_b).await
    }
}
