//! Following endpoints.

use axum::{Json, Router, extract::State, routing::post};
use buzzify_common::AppResult;
use buzzify_core::{FollowCounts, FollowOutcome};
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Target of a follow action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow the user if not followed yet, unfollow otherwise.
async fn toggle(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowOutcome>> {
    let outcome = state
        .following_service
        .toggle(user.id(), &req.user_id)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// Whether the caller follows the user. Always false for anonymous callers.
async fn status(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowOutcome>> {
    let is_following = state
        .following_service
        .is_following(user.id(), &req.user_id)
        .await?;
    Ok(ApiResponse::ok(FollowOutcome { is_following }))
}

/// Follower and following counts of a user.
async fn counts(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowCounts>> {
    let counts = state.following_service.counts(&req.user_id).await?;
    Ok(ApiResponse::ok(counts))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/status", post(status))
        .route("/counts", post(counts))
}
