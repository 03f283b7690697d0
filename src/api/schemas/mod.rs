pub mod auth;
pub mod friends;
pub mod health;
pub mod messages;
pub mod posts;
pub mod users;
