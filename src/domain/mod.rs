pub mod auth;
pub mod friendship;
pub mod message;
pub mod post;
pub mod user;
