//! Like service.

use buzzify_common::{AppError, AppResult};
use buzzify_db::repositories::{LikeRepository, PostRepository, ToggleRelationRepository};
use serde::{Deserialize, Serialize};

use super::revalidate::{RevalidationHint, RevalidatorService};

/// Like count of a post and whether the viewer is one of the likers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeInfo {
    pub likes: u64,
    pub is_liked_by_user: bool,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
    revalidator: Option<RevalidatorService>,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
            revalidator: None,
        }
    }

    /// Set the revalidator.
    pub fn set_revalidator(&mut self, revalidator: RevalidatorService) {
        self.revalidator = Some(revalidator);
    }

    /// Like the post if not liked yet, unlike it otherwise.
    pub async fn toggle(&self, subject: Option<&str>, post_id: &str) -> AppResult<LikeInfo> {
        let subject = subject.ok_or(AppError::Unauthenticated)?;
        let post = self.post_repo.get_by_id(post_id).await?;

        let state = self.like_repo.toggle(subject, &post.id).await?;
        let likes = self.like_repo.count_by_post(&post.id).await?;

        tracing::debug!(user_id = %subject, post_id = %post.id, state = ?state, likes, "Toggled like");

        if let Some(ref revalidator) = self.revalidator {
            revalidator.revalidate(RevalidationHint::home());
        }

        Ok(LikeInfo {
            likes,
            is_liked_by_user: state.is_on(),
        })
    }

    /// Current like count, plus the viewer's state when signed in.
    pub async fn info(&self, subject: Option<&str>, post_id: &str) -> AppResult<LikeInfo> {
        let likes = self.like_repo.count_by_post(post_id).await?;
        let is_liked_by_user = match subject {
            Some(subject) => self.like_repo.exists(subject, post_id).await?,
            None => false,
        };

        Ok(LikeInfo {
            likes,
            is_liked_by_user,
        })
    }
}
