use crate::services::gateway::Metrics;
use crate::services::gateway::protocol::{ClientCommand, GatewayEvent};
use crate::services::message_service::MessageService;
use crate::services::presence::{ConnectionHandle, PresenceRegistry};
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{SinkExt, StreamExt};
use opentelemetry::KeyValue;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct Session {
    pub user_id: i64,
    pub request_id: String,
    pub socket: WebSocket,
    pub presence: Arc<PresenceRegistry>,
    pub message_service: MessageService,
    pub metrics: Metrics,
    pub shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("user_id", &self.user_id).field("request_id", &self.request_id).finish_non_exhaustive()
    }
}

impl Session {
    #[tracing::instrument(
        name = "websocket_session",
        skip(self),
        fields(
            user_id = %self.user_id,
            request_id = %self.request_id,
            otel.kind = "server",
            ws.conn_id = tracing::field::Empty,
        )
    )]
    pub(crate) async fn run(self) {
        let Self { user_id, socket, presence, message_service, metrics, mut shutdown_rx, .. } = self;

        // The connection id outlives supersession: the registry removes an
        // entry only when this exact id still owns it.
        let conn_id = Uuid::new_v4();
        tracing::Span::current().record("ws.conn_id", tracing::field::display(conn_id));

        metrics.active_connections.add(1, &[]);
        tracing::info!("WebSocket connected");

        let (mut ws_sink, mut ws_stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

        loop {
            if *shutdown_rx.borrow() {
                tracing::info!("Shutdown signal received, closing WebSocket");
                let _ = ws_sink
                    .send(WsMessage::Close(Some(axum::extract::ws::CloseFrame {
                        code: axum::extract::ws::close_code::AWAY,
                        reason: "Server shutting down".into(),
                    })))
                    .await;
                break;
            }

            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {}

                msg = ws_stream.next() => {
                    let continue_loop = match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            match serde_json::from_str::<ClientCommand>(&text) {
                                Ok(command) => {
                                    handle_command(
                                        command,
                                        user_id,
                                        conn_id,
                                        &outbound_tx,
                                        &presence,
                                        &message_service,
                                        &metrics,
                                    )
                                    .await;
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "Failed to parse client command");
                                }
                            }
                            true
                        }
                        Some(Ok(WsMessage::Close(_)) | Err(_)) | None => false,
                        Some(Ok(WsMessage::Binary(_))) => {
                            tracing::warn!("Received unexpected binary message");
                            true
                        }
                        Some(Ok(WsMessage::Ping(_))) => {
                            tracing::debug!("Received heartbeat ping from client");
                            true
                        }
                        Some(Ok(WsMessage::Pong(_))) => {
                            tracing::debug!("Received heartbeat pong from client");
                            true
                        }
                    };

                    if !continue_loop { break; }
                }

                event = outbound_rx.recv() => {
                    match event {
                        Some(event) => {
                            match serde_json::to_string(&event) {
                                Ok(text) => {
                                    if ws_sink.send(WsMessage::Text(text.into())).await.is_err() { break; }
                                }
                                Err(e) => {
                                    tracing::error!(error = %e, "Failed to serialize gateway event");
                                }
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        let _ = ws_sink.close().await;

        // Disconnect must unregister exactly once, and only this connection's
        // own entry; a superseding connection's entry is left untouched.
        if presence.unregister(conn_id).is_some() {
            presence.broadcast_snapshot();
        }

        metrics.active_connections.add(-1, &[]);
        tracing::info!("WebSocket disconnected");
    }
}

async fn handle_command(
    command: ClientCommand,
    user_id: i64,
    conn_id: Uuid,
    outbound_tx: &mpsc::UnboundedSender<GatewayEvent>,
    presence: &Arc<PresenceRegistry>,
    message_service: &MessageService,
    metrics: &Metrics,
) {
    match command {
        ClientCommand::Identify { user_id: claimed } => {
            metrics.commands_total.add(1, &[KeyValue::new("command", "identify")]);

            // The payload id is advisory at best; the identity registered is
            // always the one authenticated at the upgrade.
            if let Some(claimed) = claimed
                && claimed != user_id
            {
                tracing::warn!(claimed, "Identify payload does not match authenticated identity");
            }

            presence.register(user_id, ConnectionHandle::new(conn_id, outbound_tx.clone()));
            presence.broadcast_snapshot();
        }

        ClientCommand::SendMessage { receiver_id, content } => {
            metrics.commands_total.add(1, &[KeyValue::new("command", "send_message")]);

            let Some(sender_id) = presence.user_for(conn_id) else {
                tracing::warn!("Dropping message from connection that has not identified");
                return;
            };

            if let Err(e) = message_service.send(sender_id, receiver_id, &content).await {
                tracing::warn!(error = %e, receiver_id, "Failed to deliver socket message");
            }
        }
    }
}
