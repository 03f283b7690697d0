use crate::config::AuthConfig;
use crate::domain::auth::{AuthSession, Claims, Jwt};
use crate::error::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::rngs::OsRng;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Issues an access token for an authenticated account.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn issue_session(&self, user_id: i64) -> Result<AuthSession> {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(std::time::Duration::from_secs(0))
            .as_secs() as usize
            + self.config.access_token_ttl_secs as usize;

        let claims = Claims::new(user_id, exp);
        let jwt = self.encode_jwt(&claims)?;

        Ok(AuthSession { token: jwt, expires_at: exp as i64 })
    }

    /// Verifies an access token and returns the account id (subject).
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for expired, malformed or tampered tokens.
    pub fn verify_token(&self, token: &str) -> Result<i64> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::AuthError)?;

        Ok(token_data.claims.sub)
    }

    #[tracing::instrument(err, skip(self, password))]
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::default();
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|_| AppError::Internal)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|_| AppError::Internal)?
    }

    #[tracing::instrument(err, skip(self, password, password_hash))]
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash).map_err(|_| AppError::Internal)?;
            Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
        })
        .await
        .map_err(|_| AppError::Internal)?
    }

    fn encode_jwt(&self, claims: &Claims) -> Result<Jwt> {
        let token = encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|_| AppError::Internal)?;

        Ok(Jwt(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_service() -> AuthService {
        AuthService::new(AuthConfig { jwt_secret: "test_secret".to_string(), access_token_ttl_secs: 3600 })
    }

    #[test]
    fn test_jwt_roundtrip() {
        let service = setup_service();
        let session = service.issue_session(42).expect("token issued");
        let decoded_id = service.verify_token(session.token.as_str()).expect("token verifies");

        assert_eq!(decoded_id, 42);
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let service = setup_service();
        let other = AuthService::new(AuthConfig { jwt_secret: "other_secret".to_string(), access_token_ttl_secs: 3600 });

        let session = service.issue_session(42).expect("token issued");
        assert!(matches!(other.verify_token(session.token.as_str()), Err(AppError::AuthError)));
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let service = setup_service();
        let password = "password12345";
        let hash = service.hash_password(password).await.expect("hash");

        assert!(service.verify_password(password, &hash).await.expect("verify"));
        assert!(!service.verify_password("wrong_password", &hash).await.expect("verify"));
    }
}
