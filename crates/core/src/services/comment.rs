//! Comment service.

use std::collections::HashMap;

use buzzify_common::{AppError, AppResult, IdGenerator};
use buzzify_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::revalidate::{RevalidationHint, RevalidatorService};
use super::user::UserSummary;

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub post_id: String,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    revalidator: Option<RevalidatorService>,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            revalidator: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the revalidator.
    pub fn set_revalidator(&mut self, revalidator: RevalidatorService) {
        self.revalidator = Some(revalidator);
    }

    /// Comment on a post.
    pub async fn create(
        &self,
        subject: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        let content = input.content.trim().to_string();
        let input = CreateCommentInput { content, ..input };
        input.validate()?;

        let post = self.post_repo.get_by_id(&input.post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(subject.to_string()),
            post_id: Set(post.id),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Created comment");

        if let Some(ref revalidator) = self.revalidator {
            revalidator.revalidate(RevalidationHint::home());
        }

        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub async fn list(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let author = authors.get(&c.author_id)?.clone();
                Some(CommentView {
                    id: c.id,
                    post_id: c.post_id,
                    author,
                    content: c.content,
                    created_at: c.created_at,
                })
            })
            .collect())
    }
}
