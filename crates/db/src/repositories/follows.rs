//! Follows repository.

use std::sync::Arc;

use async_trait::async_trait;
use buzzify_common::{AppError, AppResult, IdGenerator, ToggleState};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::relation::{RelationEdge, ToggleRelationRepository, toggle_edge};
use crate::entities::{Follows, follows};

/// Follows repository for database operations.
#[derive(Clone)]
pub struct FollowsRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl FollowsRepository {
    /// Create a new follows repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    fn new_edge(&self, follower_id: &str, following_id: &str) -> follows::ActiveModel {
        follows::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            following_id: Set(following_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Find a follow edge by follower and followee.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<follows::Model>> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, following_id).await?.is_some())
    }

    /// Create a follow edge.
    pub async fn create(&self, model: follows::ActiveModel) -> AppResult<follows::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a follow edge by pair. Returns whether a row was removed.
    pub async fn delete_by_pair(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        let result = Follows::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowingId.eq(following_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Edges pointing at a user, newest first.
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follows::Model>> {
        Follows::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .order_by_desc(follows::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Edges from a user, newest first.
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follows::Model>> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .order_by_desc(follows::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follows::find()
            .filter(follows::Column::FollowingId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl ToggleRelationRepository for FollowsRepository {
    async fn find_edge(
        &self,
        subject_id: &str,
        target_id: &str,
    ) -> AppResult<Option<RelationEdge>> {
        Ok(self
            .find_by_pair(subject_id, target_id)
            .await?
            .map(RelationEdge::from))
    }

    async fn create_edge(&self, subject_id: &str, target_id: &str) -> AppResult<RelationEdge> {
        let model = self.create(self.new_edge(subject_id, target_id)).await?;
        Ok(model.into())
    }

    async fn delete_edge(&self, subject_id: &str, target_id: &str) -> AppResult<bool> {
        self.delete_by_pair(subject_id, target_id).await
    }

    async fn count_for_target(&self, target_id: &str) -> AppResult<u64> {
        self.count_followers(target_id).await
    }

    async fn toggle(&self, subject_id: &str, target_id: &str) -> AppResult<ToggleState> {
        toggle_edge::<Follows>(
            self.db.as_ref(),
            follows::Column::FollowerId,
            follows::Column::FollowingId,
            subject_id,
            target_id,
            self.new_edge(subject_id, target_id),
        )
        .await
    }
}
