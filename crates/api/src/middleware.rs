//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use buzzify_common::{AppError, Config, config::FeedConfig};
use buzzify_core::{
    BroadcastRevalidator, CommentService, FollowingService, IdentityProviderService,
    JwtIdentityProvider, LikeService, PostService, RevalidatorService, SavedService, UserService,
};
use buzzify_db::repositories::{
    CommentRepository, FollowsRepository, LikeRepository, PostRepository, SavedRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Verifies session tokens.
    pub identity_provider: IdentityProviderService,
    pub user_service: UserService,
    pub following_service: FollowingService,
    pub like_service: LikeService,
    pub saved_service: SavedService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    /// Source of the revalidation SSE stream.
    pub revalidator: BroadcastRevalidator,
    /// Page sizes.
    pub feed: FeedConfig,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let identity_provider: IdentityProviderService =
            Arc::new(JwtIdentityProvider::new(&config.auth));
        Self::with_identity_provider(db, config.feed.clone(), identity_provider)
    }

    /// Same as [`Self::new`] with a custom identity provider.
    #[must_use]
    pub fn with_identity_provider(
        db: Arc<DatabaseConnection>,
        feed: FeedConfig,
        identity_provider: IdentityProviderService,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let follows_repo = FollowsRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let like_repo = LikeRepository::new(Arc::clone(&db));
        let saved_repo = SavedRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));

        let revalidator = BroadcastRevalidator::default();
        let hints: RevalidatorService = Arc::new(revalidator.clone());

        let user_service =
            UserService::new(user_repo.clone(), follows_repo.clone(), post_repo.clone());

        let mut following_service = FollowingService::new(
            follows_repo,
            user_repo.clone(),
            feed.profile_page_size,
        );
        following_service.set_revalidator(Arc::clone(&hints));

        let mut like_service = LikeService::new(like_repo.clone(), post_repo.clone());
        like_service.set_revalidator(Arc::clone(&hints));

        let mut post_service = PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            like_repo,
            saved_repo.clone(),
            comment_repo.clone(),
            feed.clone(),
        );
        post_service.set_revalidator(Arc::clone(&hints));

        let saved_service = SavedService::new(
            saved_repo,
            post_repo.clone(),
            post_service.clone(),
            feed.profile_page_size,
        );

        let mut comment_service = CommentService::new(comment_repo, post_repo, user_repo);
        comment_service.set_revalidator(hints);

        Self {
            identity_provider,
            user_service,
            following_service,
            like_service,
            saved_service,
            post_service,
            comment_service,
            revalidator,
            feed,
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token puts the [`buzzify_core::ExternalIdentity`] into the
/// request extensions, plus the local user row once the identity has been
/// synced. A missing or invalid token leaves the request anonymous; a store failure
/// while looking up the user ends the request with that error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token
        && let Some(identity) = state.identity_provider.resolve(&token).await
    {
        match state.user_service.resolve(Some(&identity)).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(AppError::UserNotFound(_)) => {
                tracing::debug!(subject = %identity.subject, "Identity has no local user yet");
            }
            Err(e) => return e.into_response(),
        }
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}
