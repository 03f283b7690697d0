pub mod account_service;
pub mod auth_service;
pub mod feed_service;
pub mod friendship_service;
pub mod gateway;
pub mod health_service;
pub mod message_service;
pub mod post_service;
pub mod presence;
pub mod rate_limit_service;
