//! API endpoints.

mod comments;
mod following;
mod likes;
mod posts;
mod saved;
mod users;

use axum::Router;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/following", following::router())
        .nest("/likes", likes::router())
        .nest("/saved", saved::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/revalidate", sse::router())
}
