use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
}

impl Claims {
    #[must_use]
    pub const fn new(sub: i64, exp: usize) -> Self {
        Self { sub, exp }
    }
}

#[derive(Debug, Clone)]
pub struct Jwt(pub(crate) String);

impl Jwt {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An issued access token and its expiry (unix seconds).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub(crate) token: Jwt,
    pub(crate) expires_at: i64,
}
