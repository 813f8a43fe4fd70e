//! Saved posts service.

use buzzify_common::{AppError, AppResult};
use buzzify_db::repositories::{PostRepository, SavedRepository, ToggleRelationRepository};
use serde::{Deserialize, Serialize};

use super::pagination::{Page, PageRequest};
use super::post::{PostService, PostView};

/// Result of a save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    /// Whether the post is saved after the toggle.
    pub is_saved: bool,
}

/// Saved posts service for business logic.
#[derive(Clone)]
pub struct SavedService {
    saved_repo: SavedRepository,
    post_repo: PostRepository,
    posts: PostService,
    page_size: u64,
}

impl SavedService {
    /// Create a new saved service.
    #[must_use]
    pub const fn new(
        saved_repo: SavedRepository,
        post_repo: PostRepository,
        posts: PostService,
        page_size: u64,
    ) -> Self {
        Self {
            saved_repo,
            post_repo,
            posts,
            page_size,
        }
    }

    /// Save the post if not saved yet, unsave it otherwise.
    pub async fn toggle(&self, subject: Option<&str>, post_id: &str) -> AppResult<SaveOutcome> {
        let subject = subject.ok_or(AppError::Unauthenticated)?;
        let post = self.post_repo.get_by_id(post_id).await?;

        let state = self.saved_repo.toggle(subject, &post.id).await?;
        tracing::debug!(user_id = %subject, post_id = %post.id, state = ?state, "Toggled save");

        Ok(SaveOutcome {
            is_saved: state.is_on(),
        })
    }

    /// Whether the viewer saved the post. Anonymous viewers have saved nothing.
    pub async fn is_saved(&self, subject: Option<&str>, post_id: &str) -> AppResult<bool> {
        match subject {
            Some(subject) => self.saved_repo.exists(subject, post_id).await,
            None => Ok(false),
        }
    }

    /// The subject's saved posts, most recently saved first.
    pub async fn saved_posts(
        &self,
        subject: &str,
        request: PageRequest,
    ) -> AppResult<Page<PostView>> {
        let entries = self
            .saved_repo
            .find_by_user(subject, self.page_size, request.offset(self.page_size))
            .await?;
        let ids: Vec<String> = entries.into_iter().map(|s| s.post_id).collect();
        let rows = Page::new(ids, request, self.page_size);

        let items = self.posts.views_for_ids(&rows.items, Some(subject)).await?;

        Ok(rows.with_items(items))
    }
}
