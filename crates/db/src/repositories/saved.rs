//! Saved (bookmark) repository.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use buzzify_common::{AppError, AppResult, IdGenerator, ToggleState};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::relation::{RelationEdge, ToggleRelationRepository, toggle_edge};
use crate::entities::{Saved, saved};

/// Saved repository for database operations.
#[derive(Clone)]
pub struct SavedRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl SavedRepository {
    /// Create a new saved repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    fn new_edge(&self, user_id: &str, post_id: &str) -> saved::ActiveModel {
        saved::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Find a saved entry by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<saved::Model>> {
        Saved::find()
            .filter(saved::Column::UserId.eq(user_id))
            .filter(saved::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a saved entry.
    pub async fn create(&self, model: saved::ActiveModel) -> AppResult<saved::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a saved entry by user and post. Returns whether a row was removed.
    pub async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let result = Saved::delete_many()
            .filter(saved::Column::UserId.eq(user_id))
            .filter(saved::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count how many users saved a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        Saved::find()
            .filter(saved::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's saved entries, most recently saved first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<saved::Model>> {
        Saved::find()
            .filter(saved::Column::UserId.eq(user_id))
            .order_by_desc(saved::Column::CreatedAt)
            .order_by_desc(saved::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Which of the given posts the user has saved.
    pub async fn saved_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let saved = Saved::find()
            .filter(saved::Column::UserId.eq(user_id))
            .filter(saved::Column::PostId.is_in(post_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(saved.into_iter().map(|s| s.post_id).collect())
    }
}

#[async_trait]
impl ToggleRelationRepository for SavedRepository {
    async fn find_edge(
        &self,
        subject_id: &str,
        target_id: &str,
    ) -> AppResult<Option<RelationEdge>> {
        Ok(self
            .find_by_user_and_post(subject_id, target_id)
            .await?
            .map(RelationEdge::from))
    }

    async fn create_edge(&self, subject_id: &str, target_id: &str) -> AppResult<RelationEdge> {
        let model = self.create(self.new_edge(subject_id, target_id)).await?;
        Ok(model.into())
    }

    async fn delete_edge(&self, subject_id: &str, target_id: &str) -> AppResult<bool> {
        self.delete_by_user_and_post(subject_id, target_id).await
    }

    async fn count_for_target(&self, target_id: &str) -> AppResult<u64> {
        self.count_by_post(target_id).await
    }

    async fn toggle(&self, subject_id: &str, target_id: &str) -> AppResult<ToggleState> {
        toggle_edge::<Saved>(
            self.db.as_ref(),
            saved::Column::UserId,
            saved::Column::PostId,
            subject_id,
            target_id,
            self.new_edge(subject_id, target_id),
        )
        .await
    }
}
