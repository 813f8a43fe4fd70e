//! Comment repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Comment, comment};
use buzzify_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments on a post, oldest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comment counts for a batch of posts. Posts without comments are absent from the map.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Comment::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "total")
            .filter(comment::Column::PostId.is_in(post_ids.iter().cloned()))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_comment(id: &str, post_id: &str, content: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            author_id: "user1".to_string(),
            post_id: post_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create() {
        let comment = create_test_comment("c1", "post1", "nice shot");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let model = comment::ActiveModel {
            id: sea_orm::Set("c1".to_string()),
            author_id: sea_orm::Set("user1".to_string()),
            post_id: sea_orm::Set("post1".to_string()),
            content: sea_orm::Set("nice shot".to_string()),
            created_at: sea_orm::Set(comment.created_at),
        };
        let created = repo.create(model).await.unwrap();

        assert_eq!(created, comment);
    }

    #[tokio::test]
    async fn test_find_by_post() {
        let c1 = create_test_comment("c1", "post1", "first");
        let c2 = create_test_comment("c2", "post1", "second");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_post("post1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content, "first");
    }

    #[tokio::test]
    async fn test_count_by_posts_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = CommentRepository::new(db);
        assert!(repo.count_by_posts(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_by_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert_eq!(repo.count_by_post("post1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_by_posts_groups() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "post_id" => sea_orm::Value::from("post1"),
                        "total" => sea_orm::Value::BigInt(Some(3)),
                    },
                    maplit::btreemap! {
                        "post_id" => sea_orm::Value::from("post2"),
                        "total" => sea_orm::Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let ids: Vec<String> = ["post1", "post2", "post3"].map(String::from).to_vec();
        let counts = repo.count_by_posts(&ids).await.unwrap();

        assert_eq!(counts.get("post1"), Some(&3));
        assert_eq!(counts.get("post2"), Some(&1));
        assert_eq!(counts.get("post3"), None);
    }
}
