//! Like endpoints.

use axum::{Json, Router, extract::State, routing::post};
use buzzify_common::AppResult;
use buzzify_core::LikeInfo;
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Target of a like action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: String,
}

/// Like the post if not liked yet, unlike it otherwise.
async fn toggle(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikeRequest>,
) -> AppResult<ApiResponse<LikeInfo>> {
    let info = state.like_service.toggle(user.id(), &req.post_id).await?;
    Ok(ApiResponse::ok(info))
}

/// Like count and the caller's like state.
async fn info(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<LikeRequest>,
) -> AppResult<ApiResponse<LikeInfo>> {
    let info = state.like_service.info(user.id(), &req.post_id).await?;
    Ok(ApiResponse::ok(info))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/info", post(info))
}
