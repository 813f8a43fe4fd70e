//! Post endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use buzzify_common::AppResult;
use buzzify_core::{CreatePostInput, Page, PageRequest, PostView};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse},
};

/// A single post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub post_id: String,
}

/// Posts by one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostsRequest {
    pub username: String,
    #[serde(default)]
    pub page: u64,
}

/// Publish a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(post))
}

/// Show a post.
async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostRequest>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.get(&req.post_id, user.id()).await?;
    Ok(ApiResponse::ok(post))
}

/// Delete one of the caller's posts.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostRequest>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&user.id, &req.post_id).await?;
    Ok(response::ok())
}

/// Home feed, newest first.
async fn feed(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Page<PostView>>> {
    let page = state.post_service.feed(user.id(), req).await?;
    Ok(ApiResponse::ok(page))
}

/// A user's posts, newest first.
async fn user_posts(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<UserPostsRequest>,
) -> AppResult<ApiResponse<Page<PostView>>> {
    let page = state
        .post_service
        .user_posts(&req.username, user.id(), PageRequest::new(req.page))
        .await?;
    Ok(ApiResponse::ok(page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/delete", post(delete))
        .route("/feed", post(feed))
        .route("/user", post(user_posts))
}
