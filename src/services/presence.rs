use crate::services::gateway::protocol::GatewayEvent;
use dashmap::DashMap;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, UpDownCounter},
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// The live end of one WebSocket connection: a stable connection id plus the
/// outbound event queue owned by that connection's session task.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    conn_id: Uuid,
    tx: mpsc::UnboundedSender<GatewayEvent>,
}

impl ConnectionHandle {
    #[must_use]
    pub const fn new(conn_id: Uuid, tx: mpsc::UnboundedSender<GatewayEvent>) -> Self {
        Self { conn_id, tx }
    }

    #[must_use]
    pub const fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    /// Queues an event for delivery; false when the session has already
    /// dropped its receiver.
    pub fn push(&self, event: GatewayEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Clone, Debug)]
struct Metrics {
    online: UpDownCounter<i64>,
    snapshots_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            online: meter
                .i64_up_down_counter("presence_online_accounts")
                .with_description("Number of accounts with a registered live connection")
                .build(),
            snapshots_total: meter
                .u64_counter("presence_snapshots_broadcast_total")
                .with_description("Total presence snapshots fanned out to connections")
                .build(),
        }
    }
}

/// Process-local map from account id to its live connection. Not persisted;
/// rebuilt from scratch on every process start.
#[derive(Debug)]
pub struct PresenceRegistry {
    entries: DashMap<i64, ConnectionHandle>,
    metrics: Metrics,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: DashMap::new(), metrics: Metrics::new() }
    }

    /// Inserts or overwrites the entry for `user_id`. An existing connection
    /// is silently superseded; its own disconnect remains responsible for its
    /// cleanup and will not touch the new entry.
    pub fn register(&self, user_id: i64, handle: ConnectionHandle) {
        match self.entries.insert(user_id, handle) {
            Some(old) => {
                tracing::debug!(user_id, old_conn = %old.conn_id(), "Superseded existing presence entry");
            }
            None => {
                self.metrics.online.add(1, &[]);
            }
        }
    }

    /// Removes whichever entry currently maps to this exact connection.
    /// A superseded connection finds nothing to remove and this is a no-op.
    /// Returns the account id that went offline, if any.
    pub fn unregister(&self, conn_id: Uuid) -> Option<i64> {
        let user_id = self
            .entries
            .iter()
            .find(|entry| entry.value().conn_id() == conn_id)
            .map(|entry| *entry.key())?;

        // Re-checked under the entry lock so a register that raced the scan
        // cannot lose its fresh handle.
        let removed = self.entries.remove_if(&user_id, |_, handle| handle.conn_id() == conn_id);
        removed.map(|(id, _)| {
            self.metrics.online.add(-1, &[]);
            id
        })
    }

    #[must_use]
    pub fn lookup(&self, user_id: i64) -> Option<ConnectionHandle> {
        self.entries.get(&user_id).map(|entry| entry.value().clone())
    }

    /// The account id registered for a connection, if it has identified.
    #[must_use]
    pub fn user_for(&self, conn_id: Uuid) -> Option<i64> {
        self.entries.iter().find(|entry| entry.value().conn_id() == conn_id).map(|entry| *entry.key())
    }

    /// Currently-online account ids.
    #[must_use]
    pub fn snapshot(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Pushes the current online snapshot to every registered connection.
    pub fn broadcast_snapshot(&self) {
        let user_ids = self.snapshot();
        let mut delivered: u64 = 0;
        for entry in self.entries.iter() {
            if entry.value().push(GatewayEvent::Online { user_ids: user_ids.clone() }) {
                delivered += 1;
            }
        }
        self.metrics.snapshots_total.add(delivered, &[KeyValue::new("event", "online")]);
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
