//! Saved posts endpoints.

use axum::{Json, Router, extract::State, routing::post};
use buzzify_common::AppResult;
use buzzify_core::{Page, PageRequest, PostView, SaveOutcome};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Target of a save action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub post_id: String,
}

/// Save the post if not saved yet, unsave it otherwise.
async fn toggle(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> AppResult<ApiResponse<SaveOutcome>> {
    let outcome = state.saved_service.toggle(user.id(), &req.post_id).await?;
    Ok(ApiResponse::ok(outcome))
}

/// Whether the caller saved the post.
async fn status(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> AppResult<ApiResponse<SaveOutcome>> {
    let is_saved = state.saved_service.is_saved(user.id(), &req.post_id).await?;
    Ok(ApiResponse::ok(SaveOutcome { is_saved }))
}

/// The caller's saved posts.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Page<PostView>>> {
    let page = state.saved_service.saved_posts(&user.id, req).await?;
    Ok(ApiResponse::ok(page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/status", post(status))
        .route("/list", post(list))
}
