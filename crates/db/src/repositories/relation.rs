//! Shared contract for toggle relation repositories (follows, likes, saves).
//!
//! Every toggle relation is a row keyed by `(subject_id, target_id)` with a unique index on
//! that pair. Existence of the row is the "on" state, absence is "off".

use async_trait::async_trait;
use buzzify_common::{AppError, AppResult, ToggleState};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, TransactionTrait, entity::prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};

use crate::entities::{follows, like, saved};

/// A relation edge, independent of the underlying table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEdge {
    /// Row id.
    pub id: String,
    /// The acting user.
    pub subject_id: String,
    /// The followed user or the liked/saved post.
    pub target_id: String,
    /// When the edge was created.
    pub created_at: DateTimeWithTimeZone,
}

impl From<follows::Model> for RelationEdge {
    fn from(m: follows::Model) -> Self {
        Self {
            id: m.id,
            subject_id: m.follower_id,
            target_id: m.following_id,
            created_at: m.created_at,
        }
    }
}

impl From<like::Model> for RelationEdge {
    fn from(m: like::Model) -> Self {
        Self {
            id: m.id,
            subject_id: m.user_id,
            target_id: m.post_id,
            created_at: m.created_at,
        }
    }
}

impl From<saved::Model> for RelationEdge {
    fn from(m: saved::Model) -> Self {
        Self {
            id: m.id,
            subject_id: m.user_id,
            target_id: m.post_id,
            created_at: m.created_at,
        }
    }
}

/// The store operations every toggle relation kind supports.
#[async_trait]
pub trait ToggleRelationRepository: Send + Sync {
    /// Find the edge for `(subject, target)`.
    async fn find_edge(&self, subject_id: &str, target_id: &str)
    -> AppResult<Option<RelationEdge>>;

    /// Create the edge for `(subject, target)`.
    async fn create_edge(&self, subject_id: &str, target_id: &str) -> AppResult<RelationEdge>;

    /// Delete the edge for `(subject, target)`. Returns whether a row was removed.
    async fn delete_edge(&self, subject_id: &str, target_id: &str) -> AppResult<bool>;

    /// Count edges pointing at `target`.
    async fn count_for_target(&self, target_id: &str) -> AppResult<u64>;

    /// Flip the edge atomically and return the new state.
    async fn toggle(&self, subject_id: &str, target_id: &str) -> AppResult<ToggleState>;

    /// Whether the edge exists.
    async fn exists(&self, subject_id: &str, target_id: &str) -> AppResult<bool> {
        Ok(self.find_edge(subject_id, target_id).await?.is_some())
    }
}

/// Flip a `(subject, target)` edge inside one transaction.
///
/// The delete runs first: if it removed a row the new state is `Off`. Otherwise the edge is
/// inserted with `ON CONFLICT DO NOTHING` on the unique pair index, so a concurrent insert
/// of the same edge cannot produce a duplicate row. Either way the edge exists afterwards
/// and the new state is `On`.
pub(crate) async fn toggle_edge<E>(
    db: &DatabaseConnection,
    subject_col: E::Column,
    target_col: E::Column,
    subject_id: &str,
    target_id: &str,
    edge: E::ActiveModel,
) -> AppResult<ToggleState>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send + 'static,
{
    let subject_id = subject_id.to_string();
    let target_id = target_id.to_string();

    db.transaction::<_, ToggleState, DbErr>(move |txn| {
        Box::pin(async move {
            let removed = E::delete_many()
                .filter(subject_col.eq(subject_id.as_str()))
                .filter(target_col.eq(target_id.as_str()))
                .exec(txn)
                .await?;

            if removed.rows_affected > 0 {
                return Ok(ToggleState::Off);
            }

            E::insert(edge)
                .on_conflict(
                    OnConflict::columns([subject_col, target_col])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await?;

            Ok(ToggleState::On)
        })
    })
    .await
    .map_err(|e| AppError::Database(e.to_string()))
}
