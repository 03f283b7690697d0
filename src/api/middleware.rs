use crate::api::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, Request, header, request::Parts},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = bearer_identity(parts, state).ok_or(AppError::AuthError)?;
        Ok(Self { user_id })
    }
}

/// A caller identity when one is available. A missing or invalid token
/// degrades to anonymous instead of rejecting the request.
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<i64>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_identity(parts, state)))
    }
}

fn bearer_identity(parts: &Parts, state: &AppState) -> Option<i64> {
    let auth_str = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    state.auth_service.verify_token(token).ok()
}

/// Generates a UUID request id; an id already set by an upstream proxy is
/// left alone by the set-request-id layer.
#[derive(Clone, Copy, Debug)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}
