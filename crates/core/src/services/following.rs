//! Following service.

use std::collections::HashMap;

use buzzify_common::{AppError, AppResult};
use buzzify_db::repositories::{FollowsRepository, ToggleRelationRepository, UserRepository};
use serde::{Deserialize, Serialize};

use super::pagination::{Page, PageRequest};
use super::revalidate::{RevalidationHint, RevalidatorService};
use super::user::UserSummary;

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOutcome {
    /// Whether the subject follows the target after the toggle.
    pub is_following: bool,
}

/// Follower and following counts for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follows_repo: FollowsRepository,
    user_repo: UserRepository,
    revalidator: Option<RevalidatorService>,
    page_size: u64,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        follows_repo: FollowsRepository,
        user_repo: UserRepository,
        page_size: u64,
    ) -> Self {
        Self {
            follows_repo,
            user_repo,
            revalidator: None,
            page_size,
        }
    }

    /// Set the revalidator.
    pub fn set_revalidator(&mut self, revalidator: RevalidatorService) {
        self.revalidator = Some(revalidator);
    }

    /// Follow the target if not following, unfollow otherwise.
    pub async fn toggle(
        &self,
        subject: Option<&str>,
        target_user_id: &str,
    ) -> AppResult<FollowOutcome> {
        let subject = subject.ok_or(AppError::Unauthenticated)?;

        if subject == target_user_id {
            return Err(AppError::InvalidOperation(
                "You cannot follow yourself".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_user_id).await?;
        let state = self.follows_repo.toggle(subject, &target.id).await?;

        tracing::info!(
            follower_id = %subject,
            following_id = %target.id,
            state = ?state,
            "Toggled follow"
        );

        if let Some(ref revalidator) = self.revalidator {
            revalidator.revalidate(RevalidationHint::profile(&target.username));
        }

        Ok(FollowOutcome {
            is_following: state.is_on(),
        })
    }

    /// Whether the subject follows the target. Anonymous callers follow nobody.
    pub async fn is_following(&self, subject: Option<&str>, target_user_id: &str) -> AppResult<bool> {
        match subject {
            Some(subject) if subject != target_user_id => {
                self.follows_repo.exists(subject, target_user_id).await
            }
            _ => Ok(false),
        }
    }

    /// Users following `username`, newest first.
    pub async fn followers(
        &self,
        username: &str,
        request: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self
            .follows_repo
            .find_followers(&user.id, self.page_size, request.offset(self.page_size))
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();

        self.summaries_page(ids, request).await
    }

    /// Users `username` follows, newest first.
    pub async fn following(
        &self,
        username: &str,
        request: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self
            .follows_repo
            .find_following(&user.id, self.page_size, request.offset(self.page_size))
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.following_id).collect();

        self.summaries_page(ids, request).await
    }

    /// Follower and following counts.
    pub async fn counts(&self, user_id: &str) -> AppResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.follows_repo.count_followers(user_id).await?,
            following: self.follows_repo.count_following(user_id).await?,
        })
    }

    async fn summaries_page(
        &self,
        ids: Vec<String>,
        request: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        let rows = Page::new(ids, request, self.page_size);
        let mut users: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&rows.items)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        let items: Vec<UserSummary> = rows
            .items
            .iter()
            .filter_map(|id| users.remove(id))
            .collect();

        Ok(rows.with_items(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::revalidate::{BroadcastRevalidator, RevalidationHint};
    use buzzify_db::entities::{follows, user};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            external_id: format!("ext_{id}"),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            name: None,
            bio: None,
            image: None,
            location: None,
            website: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_follow(follower_id: &str, following_id: &str) -> follows::Model {
        follows::Model {
            id: format!("{follower_id}_{following_id}"),
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(follows_db: MockDatabase, user_db: MockDatabase, page_size: u64) -> FollowingService {
        FollowingService::new(
            FollowsRepository::new(Arc::new(follows_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            page_size,
        )
    }

    #[tokio::test]
    async fn test_toggle_unauthenticated() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            6,
        );

        let result = service.toggle(None, "user2").await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_toggle_self_follow_rejected() {
        let follows_db = MockDatabase::new(DatabaseBackend::Postgres);
        let service = service(follows_db, MockDatabase::new(DatabaseBackend::Postgres), 6);

        let result = service.toggle(Some("user1"), "user1").await;
        assert!(
            matches!(result, Err(AppError::InvalidOperation(msg)) if msg == "You cannot follow yourself")
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_target() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            6,
        );

        let result = service.toggle(Some("user1"), "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_follow_emits_profile_hint() {
        let revalidator = BroadcastRevalidator::new(4);
        let mut hints = revalidator.subscribe();

        let mut service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec(0), exec(1)]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2", "bob")]]),
            6,
        );
        service.set_revalidator(Arc::new(revalidator));

        let outcome = service.toggle(Some("user1"), "user2").await.unwrap();

        assert!(outcome.is_following);
        assert_eq!(hints.recv().await.unwrap(), RevalidationHint::profile("bob"));
    }

    #[tokio::test]
    async fn test_toggle_unfollow() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec(1)]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2", "bob")]]),
            6,
        );

        let outcome = service.toggle(Some("user1"), "user2").await.unwrap();
        assert!(!outcome.is_following);
    }

    #[tokio::test]
    async fn test_is_following_anonymous_is_false() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            6,
        );

        assert!(!service.is_following(None, "user2").await.unwrap());
        assert!(!service.is_following(Some("user2"), "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_followers_preserve_edge_order() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                create_test_follow("user3", "user1"),
                create_test_follow("user2", "user1"),
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user1", "alice")]])
                .append_query_results([[
                    create_test_user("user2", "bob"),
                    create_test_user("user3", "carol"),
                ]]),
            2,
        );

        let page = service
            .followers("alice", PageRequest::new(0))
            .await
            .unwrap();

        let names: Vec<_> = page.items.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["carol", "bob"]);
        assert_eq!(page.next_page, Some(1));
    }
}
