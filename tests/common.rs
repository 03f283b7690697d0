#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use mingle_server::api::ServiceContainer;
use mingle_server::config::{AuthConfig, Config, LogFormat, RateLimitConfig, ServerConfig, TelemetryConfig};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("mingle_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap())
            .add_directive("tungstenite=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            shutdown_timeout_secs: 5,
            trusted_proxies: vec!["127.0.0.1/32".parse().unwrap()],
        },
        auth: AuthConfig { jwt_secret: "test_secret".to_string(), access_token_ttl_secs: 3600 },
        rate_limit: RateLimitConfig { per_second: 10_000, burst: 10_000, auth_per_second: 10_000, auth_burst: 10_000 },
        telemetry: TelemetryConfig { otlp_endpoint: None, log_format: LogFormat::Text },
    }
}

pub struct TestUser {
    pub user_id: i64,
    pub token: String,
    pub email: String,
}

pub struct TestApp {
    pub client: reqwest::Client,
    pub server_url: String,
    pub ws_url: String,
    pub pool: PgPool,
    shutdown_tx: watch::Sender<bool>,
}

impl TestApp {
    /// Spawns the app against the database in `DATABASE_URL`. Returns `None`
    /// when no database is configured so tests can skip instead of erroring.
    pub async fn spawn() -> Option<Self> {
        setup_tracing();

        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let config = get_test_config(&database_url);
        let pool = mingle_server::storage::init_pool(&database_url)
            .await
            .expect("Failed to connect to DB. Is Postgres running?");
        mingle_server::run_migrations(&pool).await.expect("Failed to run migrations");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let services = ServiceContainer::build(&config, pool.clone());
        let router = mingle_server::api::app_router(config, services, shutdown_rx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");

        let mut serve_rx = shutdown_rx;
        tokio::spawn(async move {
            let server = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = serve_rx.wait_for(|&s| s).await;
                });
            let _ = server.await;
        });

        Some(Self {
            client: reqwest::Client::new(),
            server_url: format!("http://{addr}"),
            ws_url: format!("ws://{addr}"),
            pool,
            shutdown_tx,
        })
    }

    /// Registers a fresh account with a unique email and logs it in.
    pub async fn register_user(&self, name: &str) -> TestUser {
        let email = format!("{name}_{}@example.com", &Uuid::new_v4().to_string()[..8]);

        let resp = self
            .client
            .post(format!("{}/api/users", self.server_url))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "age": 30,
                "password": "password12345",
            }))
            .send()
            .await
            .expect("register request");
        assert_eq!(resp.status().as_u16(), 201, "registration failed");

        let user: serde_json::Value = resp.json().await.expect("registration body");
        let user_id = user["id"].as_i64().expect("user id");

        let resp = self
            .client
            .post(format!("{}/api/login", self.server_url))
            .json(&serde_json::json!({ "email": email, "password": "password12345" }))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status().as_u16(), 200, "login failed");

        let body: serde_json::Value = resp.json().await.expect("login body");
        let token = body["token"].as_str().expect("token").to_string();

        TestUser { user_id, token, email }
    }

    pub async fn send_friend_request(&self, token: &str, addressee_id: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/api/friend-requests", self.server_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "addressee_id": addressee_id }))
            .send()
            .await
            .expect("friend request")
    }

    pub async fn respond_request(&self, token: &str, request_id: i64, status: &str) -> reqwest::Response {
        self.client
            .put(format!("{}/api/friend-requests/{request_id}", self.server_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .expect("respond request")
    }

    /// Creates an accepted friendship and returns the row id.
    pub async fn befriend(&self, requester: &TestUser, addressee: &TestUser) -> i64 {
        let resp = self.send_friend_request(&requester.token, addressee.user_id).await;
        assert_eq!(resp.status().as_u16(), 201);
        let row: serde_json::Value = resp.json().await.expect("request body");
        let request_id = row["id"].as_i64().expect("request id");

        let resp = self.respond_request(&addressee.token, request_id, "ACCEPTED").await;
        assert_eq!(resp.status().as_u16(), 200);
        request_id
    }

    pub async fn create_post(&self, token: &str, content: &str) -> i64 {
        let resp = self
            .client
            .post(format!("{}/api/posts", self.server_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .expect("create post");
        assert_eq!(resp.status().as_u16(), 201);

        let post: serde_json::Value = resp.json().await.expect("post body");
        post["id"].as_i64().expect("post id")
    }

    pub async fn toggle_like(&self, token: &str, post_id: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/api/posts/{post_id}/like", self.server_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("toggle like")
    }

    pub async fn get_json(&self, token: Option<&str>, path: &str) -> serde_json::Value {
        let mut req = self.client.get(format!("{}{path}", self.server_url));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("get request");
        assert_eq!(resp.status().as_u16(), 200, "GET {path} failed");
        resp.json().await.expect("json body")
    }

    pub async fn message_history(&self, token: &str, other_user_id: i64) -> serde_json::Value {
        self.get_json(Some(token), &format!("/api/messages/{other_user_id}")).await
    }

    pub async fn connect_ws(&self, token: &str) -> WsClient {
        let url = format!("{}/api/gateway?token={token}", self.ws_url);
        let (stream, _) = connect_async(url).await.expect("websocket connect");
        WsClient { stream }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    async fn send_json(&mut self, value: &serde_json::Value) {
        let text = serde_json::to_string(value).expect("serialize command");
        self.stream.send(WsMessage::Text(text.into())).await.expect("ws send");
    }

    pub async fn identify(&mut self) {
        self.send_json(&serde_json::json!({ "type": "Identify", "data": {} })).await;
    }

    pub async fn send_message(&mut self, receiver_id: i64, content: &str) {
        self.send_json(&serde_json::json!({
            "type": "SendMessage",
            "data": { "receiver_id": receiver_id, "content": content },
        }))
        .await;
    }

    /// Next JSON event within the timeout, or `None` on silence or close.
    pub async fn next_event(&mut self, timeout: Duration) -> Option<serde_json::Value> {
        loop {
            let msg = tokio::time::timeout(timeout, self.stream.next()).await.ok()??;
            match msg.ok()? {
                WsMessage::Text(text) => return serde_json::from_str(&text).ok(),
                WsMessage::Close(_) => return None,
                _ => {}
            }
        }
    }

    /// Waits for an `Online` snapshot satisfying the predicate, skipping
    /// everything else.
    pub async fn wait_for_online<F>(&mut self, timeout: Duration, predicate: F) -> Option<Vec<i64>>
    where
        F: Fn(&[i64]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(tokio::time::Instant::now())?;
            let event = self.next_event(remaining).await?;
            if event["type"] == "Online" {
                let user_ids: Vec<i64> =
                    event["data"]["user_ids"].as_array()?.iter().filter_map(serde_json::Value::as_i64).collect();
                if predicate(&user_ids) {
                    return Some(user_ids);
                }
            }
        }
    }

    /// Waits for a `Message` event, skipping presence snapshots.
    pub async fn wait_for_message(&mut self, timeout: Duration) -> Option<serde_json::Value> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(tokio::time::Instant::now())?;
            let event = self.next_event(remaining).await?;
            if event["type"] == "Message" {
                return Some(event["data"].clone());
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Skips the current test with a note when no database is configured.
#[macro_export]
macro_rules! require_app {
    () => {
        match common::TestApp::spawn().await {
            Some(app) => app,
            None => {
                eprintln!("skipping: DATABASE_URL not set");
                return;
            }
        }
    };
}
