use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckEmail {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailExists {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: i64,
}
