//! Post service.

use std::collections::HashMap;

use buzzify_common::{AppError, AppResult, IdGenerator, config::FeedConfig};
use buzzify_db::{
    entities::post,
    repositories::{
        CommentRepository, LikeRepository, PostRepository, SavedRepository, UserRepository,
    },
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::{Page, PageRequest};
use super::revalidate::{RevalidationHint, RevalidatorService};
use super::user::UserSummary;

/// Maximum description length.
pub const MAX_DESCRIPTION_LENGTH: u64 = 2200;

/// A post as shown in a feed, with its author, counters and the viewer's toggle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: UserSummary,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub likes: u64,
    pub comments: u64,
    /// Always false for anonymous viewers.
    pub is_liked: bool,
    /// Always false for anonymous viewers.
    pub is_saved: bool,
}

/// Input for creating a post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 2200))]
    pub description: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    like_repo: LikeRepository,
    saved_repo: SavedRepository,
    comment_repo: CommentRepository,
    revalidator: Option<RevalidatorService>,
    feed: FeedConfig,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        like_repo: LikeRepository,
        saved_repo: SavedRepository,
        comment_repo: CommentRepository,
        feed: FeedConfig,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            like_repo,
            saved_repo,
            comment_repo,
            revalidator: None,
            feed,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the revalidator.
    pub fn set_revalidator(&mut self, revalidator: RevalidatorService) {
        self.revalidator = Some(revalidator);
    }

    fn revalidate_home(&self) {
        if let Some(ref revalidator) = self.revalidator {
            revalidator.revalidate(RevalidationHint::home());
        }
    }

    /// Publish a post.
    pub async fn create(&self, subject: &str, input: CreatePostInput) -> AppResult<PostView> {
        input.validate()?;

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let image = input.image.filter(|i| !i.is_empty());

        if description.is_none() && image.is_none() {
            return Err(AppError::Validation(
                "A post needs a description or an image".to_string(),
            ));
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(subject.to_string()),
            description: Set(description),
            image: Set(image),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, author_id = %subject, "Created post");
        self.revalidate_home();

        let mut views = self.decorate(vec![post], Some(subject)).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Created post has no author".to_string()))
    }

    /// A single post.
    pub async fn get(&self, post_id: &str, subject: Option<&str>) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let mut views = self.decorate(vec![post], subject).await?;
        views
            .pop()
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))
    }

    /// Delete a post. Only its author may do this.
    pub async fn delete(&self, subject: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != subject {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id = %post_id, "Deleted post");
        self.revalidate_home();

        Ok(())
    }

    /// The home feed, newest first.
    pub async fn feed(
        &self,
        subject: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Page<PostView>> {
        let size = self.feed.home_page_size;
        let posts = self
            .post_repo
            .find_feed(size, request.offset(size))
            .await?;
        let mut rows = Page::new(posts, request, size);
        let items = self.decorate(std::mem::take(&mut rows.items), subject).await?;

        Ok(rows.with_items(items))
    }

    /// A user's posts, newest first.
    pub async fn user_posts(
        &self,
        username: &str,
        subject: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Page<PostView>> {
        let author = self.user_repo.get_by_username(username).await?;
        let size = self.feed.profile_page_size;
        let posts = self
            .post_repo
            .find_by_author(&author.id, size, request.offset(size))
            .await?;
        let mut rows = Page::new(posts, request, size);
        let items = self.decorate(std::mem::take(&mut rows.items), subject).await?;

        Ok(rows.with_items(items))
    }

    /// Views for posts by id, in the order given. Ids of deleted posts are skipped.
    pub async fn views_for_ids(
        &self,
        ids: &[String],
        subject: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        let mut by_id: HashMap<String, post::Model> = self
            .post_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let ordered: Vec<post::Model> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        self.decorate(ordered, subject).await
    }

    /// Attach authors, counters and the viewer's like/save state to posts.
    async fn decorate(
        &self,
        posts: Vec<post::Model>,
        subject: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();
        let likes = self.like_repo.count_by_posts(&post_ids).await?;
        let comments = self.comment_repo.count_by_posts(&post_ids).await?;

        let (liked, saved) = match subject {
            Some(subject) => (
                self.like_repo.liked_post_ids(subject, &post_ids).await?,
                self.saved_repo.saved_post_ids(subject, &post_ids).await?,
            ),
            None => Default::default(),
        };

        Ok(posts
            .into_iter()
            .filter_map(|p| {
                let author = authors.get(&p.author_id)?.clone();
                Some(PostView {
                    likes: likes.get(&p.id).copied().unwrap_or(0),
                    comments: comments.get(&p.id).copied().unwrap_or(0),
                    is_liked: liked.contains(&p.id),
                    is_saved: saved.contains(&p.id),
                    id: p.id,
                    author,
                    description: p.description,
                    image: p.image,
                    created_at: p.created_at,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buzzify_db::entities::{like, saved, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
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

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            description: Some("hello".to_string()),
            image: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(post_id: &str, total: i64) -> std::collections::BTreeMap<&'static str, Value> {
        maplit::btreemap! {
            "post_id" => Value::from(post_id),
            "total" => Value::BigInt(Some(total)),
        }
    }

    struct Dbs {
        post: MockDatabase,
        user: MockDatabase,
        like: MockDatabase,
        saved: MockDatabase,
        comment: MockDatabase,
    }

    impl Dbs {
        fn new() -> Self {
            Self {
                post: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
                like: MockDatabase::new(DatabaseBackend::Postgres),
                saved: MockDatabase::new(DatabaseBackend::Postgres),
                comment: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn service(self) -> PostService {
            PostService::new(
                PostRepository::new(Arc::new(self.post.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
                LikeRepository::new(Arc::new(self.like.into_connection())),
                SavedRepository::new(Arc::new(self.saved.into_connection())),
                CommentRepository::new(Arc::new(self.comment.into_connection())),
                FeedConfig::default(),
            )
        }
    }

    #[tokio::test]
    async fn test_create_requires_content() {
        let service = Dbs::new().service();

        let result = service
            .create(
                "user1",
                CreatePostInput {
                    description: Some("   ".to_string()),
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_description() {
        let service = Dbs::new().service();

        let result = service
            .create(
                "user1",
                CreatePostInput {
                    description: Some("x".repeat(MAX_DESCRIPTION_LENGTH as usize + 1)),
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_image_url() {
        let service = Dbs::new().service();

        let result = service
            .create(
                "user1",
                CreatePostInput {
                    description: None,
                    image: Some("not-a-url".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let mut dbs = Dbs::new();
        dbs.post = dbs
            .post
            .append_query_results([[create_test_post("post1", "user1")]]);
        let service = dbs.service();

        let result = service.delete("user2", "post1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_author() {
        let mut dbs = Dbs::new();
        dbs.post = dbs
            .post
            .append_query_results([[create_test_post("post1", "user1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let service = dbs.service();

        assert!(service.delete("user1", "post1").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let mut dbs = Dbs::new();
        dbs.post = dbs
            .post
            .append_query_results([Vec::<post::Model>::new()]);
        let service = dbs.service();

        let result = service.get("missing", None).await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_feed_decorates_for_viewer() {
        let mut dbs = Dbs::new();
        dbs.post = dbs.post.append_query_results([[
            create_test_post("post2", "user2"),
            create_test_post("post1", "user1"),
        ]]);
        dbs.user = dbs.user.append_query_results([[
            create_test_user("user1", "alice"),
            create_test_user("user2", "bob"),
        ]]);
        dbs.like = dbs
            .like
            .append_query_results([[count_row("post1", 5)]])
            .append_query_results([[like::Model {
                id: "l1".to_string(),
                user_id: "user1".to_string(),
                post_id: "post1".to_string(),
                created_at: Utc::now().into(),
            }]]);
        dbs.comment = dbs
            .comment
            .append_query_results([[count_row("post2", 2)]]);
        dbs.saved = dbs
            .saved
            .append_query_results([Vec::<saved::Model>::new()]);
        let service = dbs.service();

        let page = service
            .feed(Some("user1"), PageRequest::new(0))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page, None);

        let newest = &page.items[0];
        assert_eq!(newest.id, "post2");
        assert_eq!(newest.author.username, "bob");
        assert_eq!((newest.likes, newest.comments), (0, 2));
        assert!(!newest.is_liked);

        let older = &page.items[1];
        assert_eq!((older.likes, older.is_liked, older.is_saved), (5, true, false));
    }

    #[tokio::test]
    async fn test_feed_empty() {
        let mut dbs = Dbs::new();
        dbs.post = dbs
            .post
            .append_query_results([Vec::<post::Model>::new()]);
        let service = dbs.service();

        let page = service.feed(None, PageRequest::new(3)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page, None);
    }
}
