pub mod protocol;
pub(crate) mod session;

use crate::services::gateway::session::Session;
use crate::services::message_service::MessageService;
use crate::services::presence::PresenceRegistry;
use axum::extract::ws::WebSocket;
use opentelemetry::{
    global,
    metrics::{Counter, UpDownCounter},
};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) active_connections: UpDownCounter<i64>,
    pub(crate) commands_total: Counter<u64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("mingle-server");
        Self {
            active_connections: meter
                .i64_up_down_counter("websocket_active_connections")
                .with_description("Number of active WebSocket connections")
                .build(),
            commands_total: meter
                .u64_counter("websocket_commands_total")
                .with_description("Client commands received, by type")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the WebSocket side of the system: one session task per connection,
/// all sharing the presence registry and the message pipeline.
#[derive(Clone, Debug)]
pub struct GatewayService {
    presence: Arc<PresenceRegistry>,
    message_service: MessageService,
    metrics: Metrics,
}

impl GatewayService {
    #[must_use]
    pub fn new(presence: Arc<PresenceRegistry>, message_service: MessageService) -> Self {
        Self { presence, message_service, metrics: Metrics::new() }
    }

    pub async fn handle_socket(
        &self,
        socket: WebSocket,
        user_id: i64,
        request_id: String,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let session = Session {
            user_id,
            request_id,
            socket,
            presence: Arc::clone(&self.presence),
            message_service: self.message_service.clone(),
            metrics: self.metrics.clone(),
            shutdown_rx,
        };

        session.run().await;
    }
}
