use crate::config::Config;
use crate::services::account_service::AccountService;
use crate::services::auth_service::AuthService;
use crate::services::feed_service::FeedService;
use crate::services::friendship_service::FriendshipService;
use crate::services::gateway::GatewayService;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use crate::services::post_service::PostService;
use crate::services::presence::PresenceRegistry;
use crate::services::rate_limit_service::RateLimitService;
use crate::storage::DbPool;
use crate::storage::friendship_repo::FriendshipRepository;
use crate::storage::message_repo::MessageRepository;
use crate::storage::post_repo::PostRepository;
use crate::storage::user_repo::UserRepository;
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod feed;
pub mod friends;
pub mod gateway;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod posts;
pub mod rate_limit;
pub mod schemas;
pub mod users;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub account_service: AccountService,
    pub auth_service: AuthService,
    pub friendship_service: FriendshipService,
    pub message_service: MessageService,
    pub feed_service: FeedService,
    pub post_service: PostService,
    pub gateway_service: GatewayService,
    pub rate_limit_service: RateLimitService,
    pub shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub pool: DbPool,
    pub account_service: AccountService,
    pub auth_service: AuthService,
    pub friendship_service: FriendshipService,
    pub message_service: MessageService,
    pub feed_service: FeedService,
    pub post_service: PostService,
    pub gateway_service: GatewayService,
    pub health_service: HealthService,
    pub rate_limit_service: RateLimitService,
}

impl ServiceContainer {
    /// Wires every service onto a shared pool and a fresh presence registry.
    #[must_use]
    pub fn build(config: &Config, pool: DbPool) -> Self {
        let user_repo = UserRepository::new();
        let presence = Arc::new(PresenceRegistry::new());

        let auth_service = AuthService::new(config.auth.clone());
        let account_service = AccountService::new(pool.clone(), user_repo.clone(), auth_service.clone());
        let friendship_service =
            FriendshipService::new(pool.clone(), FriendshipRepository::new(), user_repo.clone());
        let message_service =
            MessageService::new(pool.clone(), MessageRepository::new(), user_repo, Arc::clone(&presence));
        let feed_service = FeedService::new(pool.clone(), FriendshipRepository::new(), PostRepository::new());
        let post_service = PostService::new(pool.clone(), PostRepository::new());
        let gateway_service = GatewayService::new(presence, message_service.clone());
        let health_service = HealthService::new(pool.clone());
        let rate_limit_service = RateLimitService::new(config.server.trusted_proxies.clone());

        Self {
            pool,
            account_service,
            auth_service,
            friendship_service,
            message_service,
            feed_service,
            post_service,
            gateway_service,
            health_service,
            rate_limit_service,
        }
    }
}

/// Configures and returns the primary application router.
///
/// # Panics
/// Panics if the rate limiter configuration cannot be constructed.
pub fn app_router(
    config: Config,
    services: ServiceContainer,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Router {
    let std_interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let standard_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(std_interval_ns))
            .burst_size(config.rate_limit.burst)
            .key_extractor(services.rate_limit_service.extractor.clone())
            .finish()
            .expect("Failed to build standard rate limiter config"),
    );

    // Auth Tier: Stricter limits for expensive login & registration probing
    let auth_interval_ns = 1_000_000_000 / config.rate_limit.auth_per_second.max(1);
    let auth_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(auth_interval_ns))
            .burst_size(config.rate_limit.auth_burst)
            .key_extractor(services.rate_limit_service.extractor.clone())
            .finish()
            .expect("Failed to build auth rate limiter config"),
    );

    let state = AppState {
        config,
        account_service: services.account_service,
        auth_service: services.auth_service,
        friendship_service: services.friendship_service,
        message_service: services.message_service,
        feed_service: services.feed_service,
        post_service: services.post_service,
        gateway_service: services.gateway_service,
        rate_limit_service: services.rate_limit_service,
        shutdown_rx,
    };

    // Sensitive routes with strict limits
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/check-email", post(auth::check_email))
        .layer(GovernorLayer::new(auth_conf));

    // Standard routes
    let api_routes = Router::new()
        .route("/users", post(auth::register).get(users::list_users))
        .route("/users/{userId}", get(users::get_user).put(users::update_profile))
        .route("/users/{userId}/posts", get(posts::user_posts))
        .route("/posts", post(posts::create_post))
        .route("/posts/{postId}/like", post(posts::toggle_like))
        .route("/feed", get(feed::feed))
        .route("/friend-requests", post(friends::create_request).get(friends::list_incoming))
        .route("/friend-requests/sent", get(friends::list_outgoing))
        .route("/friend-requests/{requestId}", put(friends::respond))
        .route("/friendship-status/{otherUserId}", get(friends::friendship_status))
        .route("/friends", get(friends::list_friends))
        .route("/messages/{otherUserId}", get(messages::history))
        .route("/gateway", get(gateway::websocket_handler))
        .layer(GovernorLayer::new(standard_conf));

    Router::new()
        .nest("/api", auth_routes.merge(api_routes))
        .layer(from_fn_with_state(state.clone(), rate_limit::log_rate_limit_events))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                        "user_id" = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuid,
        ))
        .with_state(state)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
