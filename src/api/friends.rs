use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::friends::{
    FriendRequestCreate, FriendshipResponse, FriendshipStatusResponse, PendingRequestResponse, RespondBody,
};
use crate::api::schemas::users::ProfileResponse;
use crate::domain::friendship::{Decision, RespondOutcome};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn create_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<FriendRequestCreate>,
) -> Result<impl IntoResponse> {
    let friendship = state.friendship_service.send_request(auth_user.user_id, payload.addressee_id).await?;
    Ok((StatusCode::CREATED, Json(FriendshipResponse::from(friendship))))
}

pub async fn list_incoming(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let requests = state.friendship_service.list_incoming(auth_user.user_id).await?;
    Ok(Json(requests.into_iter().map(PendingRequestResponse::incoming).collect::<Vec<_>>()))
}

pub async fn list_outgoing(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let requests = state.friendship_service.list_outgoing(auth_user.user_id).await?;
    Ok(Json(requests.into_iter().map(PendingRequestResponse::outgoing).collect::<Vec<_>>()))
}

/// Applies the addressee's decision: accepting returns the updated row,
/// rejecting deletes it and returns no content.
pub async fn respond(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(payload): Json<RespondBody>,
) -> Result<impl IntoResponse> {
    let decision = match payload.status.as_str() {
        "ACCEPTED" => Decision::Accept,
        "REJECTED" => Decision::Reject,
        _ => return Err(AppError::BadRequest("Invalid status".into())),
    };

    let outcome = state.friendship_service.respond(request_id, auth_user.user_id, decision).await?;
    Ok(match outcome {
        RespondOutcome::Accepted(friendship) => {
            (StatusCode::OK, Json(FriendshipResponse::from(friendship))).into_response()
        }
        RespondOutcome::Removed => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn friendship_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(other_user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let friendship = state.friendship_service.status_between(auth_user.user_id, other_user_id).await?;
    Ok(Json(FriendshipStatusResponse::from(friendship)))
}

pub async fn list_friends(auth_user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let friends = state.friendship_service.list_friends(auth_user.user_id).await?;
    Ok(Json(friends.into_iter().map(ProfileResponse::from).collect::<Vec<_>>()))
}
