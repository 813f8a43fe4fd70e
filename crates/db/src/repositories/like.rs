//! Like repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use buzzify_common::{AppError, AppResult, IdGenerator, ToggleState};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, sea_query::Expr,
};

use super::relation::{RelationEdge, ToggleRelationRepository, toggle_edge};
use crate::entities::{Like, like};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    fn new_edge(&self, user_id: &str, post_id: &str) -> like::ActiveModel {
        like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Find a like by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a like.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a like by user and post. Returns whether a row was removed.
    pub async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let result = Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Like counts for a batch of posts. Posts without likes are absent from the map.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Like::find()
            .select_only()
            .column(like::Column::PostId)
            .column_as(Expr::col(like::Column::Id).count(), "total")
            .filter(like::Column::PostId.is_in(post_ids.iter().cloned()))
            .group_by(like::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }

    /// Which of the given posts the user has liked.
    pub async fn liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let likes = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.is_in(post_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(likes.into_iter().map(|l| l.post_id).collect())
    }
}

#[async_trait]
impl ToggleRelationRepository for LikeRepository {
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
        toggle_edge::<Like>(
            self.db.as_ref(),
            like::Column::UserId,
            like::Column::PostId,
            subject_id,
            target_id,
            self.new_edge(subject_id, target_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_post() {
        let like = create_test_like("l1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like.clone()]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.find_by_user_and_post("user1", "post1").await.unwrap();

        assert_eq!(result, Some(like));
    }

    #[tokio::test]
    async fn test_exists_false_when_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert!(!repo.exists("user1", "post1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_edge() {
        let like = create_test_like("l1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let edge = repo.create_edge("user1", "post1").await.unwrap();

        assert_eq!(edge.subject_id, "user1");
        assert_eq!(edge.target_id, "post1");
    }

    #[tokio::test]
    async fn test_liked_post_ids() {
        let l1 = create_test_like("l1", "user1", "post1");
        let l2 = create_test_like("l2", "user1", "post3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[l1, l2]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let ids: Vec<String> = ["post1", "post2", "post3"].map(String::from).to_vec();
        let liked = repo.liked_post_ids("user1", &ids).await.unwrap();

        assert!(liked.contains("post1"));
        assert!(!liked.contains("post2"));
        assert!(liked.contains("post3"));
    }

    #[tokio::test]
    async fn test_batch_helpers_skip_query_for_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        assert!(repo.count_by_posts(&[]).await.unwrap().is_empty());
        assert!(repo.liked_post_ids("user1", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_twice_round_trips() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert_eq!(repo.toggle("user1", "post1").await.unwrap(), ToggleState::On);
        assert_eq!(repo.toggle("user1", "post1").await.unwrap(), ToggleState::Off);
    }
}
