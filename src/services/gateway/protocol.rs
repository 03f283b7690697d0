use crate::domain::message::Message;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Commands sent FROM client TO server over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientCommand {
    /// Announce readiness to receive pushes. The registered identity always
    /// comes from the authenticated connection; a client-supplied id is only
    /// checked for mismatch and never trusted.
    Identify {
        #[serde(default)]
        user_id: Option<i64>,
    },

    /// Send a direct message to another account.
    SendMessage { receiver_id: i64, content: String },
}

/// Events pushed FROM server TO clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// A persisted direct message, delivered live to its recipient.
    Message {
        id: i64,
        sender_id: i64,
        receiver_id: i64,
        content: String,
        #[serde(with = "time::serde::rfc3339")]
        created_at: OffsetDateTime,
    },

    /// Full snapshot of currently-online account ids, pushed to every
    /// connection whenever someone connects or disconnects.
    Online { user_ids: Vec<i64> },
}

impl GatewayEvent {
    #[must_use]
    pub fn message(msg: &Message) -> Self {
        Self::Message {
            id: msg.id,
            sender_id: msg.sender_id,
            receiver_id: msg.receiver_id,
            content: msg.content.clone(),
            created_at: msg.created_at,
        }
    }
}
