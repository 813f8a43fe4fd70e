//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use buzzify_common::AppResult;
use buzzify_core::{CommentView, CreateCommentInput, UserSummary};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Comments of a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub post_id: String,
}

/// Comment on a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentView>> {
    let comment = state.comment_service.create(&user.id, input).await?;

    Ok(ApiResponse::ok(CommentView {
        id: comment.id,
        post_id: comment.post_id,
        author: UserSummary::from(&user),
        content: comment.content,
        created_at: comment.created_at,
    }))
}

/// Comments on a post, oldest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentView>>> {
    let comments = state.comment_service.list(&req.post_id).await?;
    Ok(ApiResponse::ok(comments))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
}
