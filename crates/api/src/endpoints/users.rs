//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use buzzify_common::AppResult;
use buzzify_core::{Page, PageRequest, Profile, UpdateProfileInput, UserSummary};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthIdentity, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Look up a user by username.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameRequest {
    pub username: String,
    #[serde(default)]
    pub page: u64,
}

/// Profile plus the caller's relation to it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub is_following: bool,
    pub is_self: bool,
}

/// Create the local user for a fresh identity, or return the existing one.
async fn sync(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserSummary>> {
    let user = state.user_service.sync(&identity).await?;
    Ok(ApiResponse::ok(UserSummary::from(&user)))
}

/// The caller's own profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state.user_service.profile(&user.username).await?;
    Ok(ApiResponse::ok(profile))
}

/// Profile page data.
async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<UsernameRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.user_service.profile(&req.username).await?;
    let is_self = user.id() == Some(profile.id.as_str());
    let is_following = if is_self {
        false
    } else {
        state
            .following_service
            .is_following(user.id(), &profile.id)
            .await?
    };

    Ok(ApiResponse::ok(ProfileResponse {
        profile,
        is_following,
        is_self,
    }))
}

/// Edit the caller's profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserSummary>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(UserSummary::from(&updated)))
}

/// Who to follow.
async fn suggestions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserSummary>>> {
    let users = state
        .user_service
        .suggestions(&user.id, state.feed.suggestions_page_size)
        .await?;
    Ok(ApiResponse::ok(users))
}

/// Users following `username`.
async fn followers(
    State(state): State<AppState>,
    Json(req): Json<UsernameRequest>,
) -> AppResult<ApiResponse<Page<UserSummary>>> {
    let page = state
        .following_service
        .followers(&req.username, PageRequest::new(req.page))
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Users `username` follows.
async fn following(
    State(state): State<AppState>,
    Json(req): Json<UsernameRequest>,
) -> AppResult<ApiResponse<Page<UserSummary>>> {
    let page = state
        .following_service
        .following(&req.username, PageRequest::new(req.page))
        .await?;
    Ok(ApiResponse::ok(page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", post(sync))
        .route("/me", post(me))
        .route("/show", post(show))
        .route("/update", post(update))
        .route("/suggestions", post(suggestions))
        .route("/followers", post(followers))
        .route("/following", post(following))
}
