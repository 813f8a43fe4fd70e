//! User service: identity sync, profiles and "who to follow".

use buzzify_common::{AppError, AppResult, IdGenerator};
use buzzify_db::{
    entities::user,
    repositories::{FollowsRepository, PostRepository, UserRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::identity::ExternalIdentity;

/// The public bits of a user, embedded in posts, comments and user lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            name: u.name.clone(),
            image: u.image.clone(),
        }
    }
}

/// A profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
}

/// Editable profile fields. `None` leaves a field unchanged; an empty string clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 30), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(length(max = 160))]
    pub bio: Option<String>,
    #[validate(length(max = 30))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_website"))]
    pub website: Option<String>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset"))
    }
}

fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.is_empty() || url::Url::parse(website).is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// Turn a provider username or email local part into a valid local username.
fn username_candidate(identity: &ExternalIdentity) -> String {
    let raw = identity
        .username
        .clone()
        .unwrap_or_else(|| identity.email.split('@').next().unwrap_or_default().to_string());

    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
        .take(24)
        .collect();

    if cleaned.len() < 3 {
        format!("user_{cleaned}")
    } else {
        cleaned
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    follows_repo: FollowsRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        follows_repo: FollowsRepository,
        post_repo: PostRepository,
    ) -> Self {
        Self {
            user_repo,
            follows_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Make sure a local user exists for an identity and return it.
    pub async fn sync(&self, identity: &ExternalIdentity) -> AppResult<user::Model> {
        if let Some(existing) = self
            .user_repo
            .find_by_external_id(&identity.subject)
            .await?
        {
            return Ok(existing);
        }

        let id = self.id_gen.generate();
        let mut username = username_candidate(identity);
        if self.user_repo.find_by_username(&username).await?.is_some() {
            let suffix = &id[id.len() - 5..];
            username = format!("{username}_{suffix}");
        }

        let model = user::ActiveModel {
            id: Set(id),
            external_id: Set(identity.subject.clone()),
            email: Set(identity.email.clone()),
            username: Set(username),
            name: Set(identity.name.clone()),
            bio: Set(None),
            image: Set(identity.image.clone()),
            location: Set(None),
            website: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Synced new user");
        Ok(user)
    }

    /// Map an identity to its local user.
    ///
    /// No identity means an anonymous caller. An identity that was never synced is an error.
    pub async fn resolve(
        &self,
        identity: Option<&ExternalIdentity>,
    ) -> AppResult<Option<user::Model>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        self.user_repo
            .find_by_external_id(&identity.subject)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::UserNotFound(identity.subject.clone()))
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Profile page data for a username.
    pub async fn profile(&self, username: &str) -> AppResult<Profile> {
        let user = self.user_repo.get_by_username(username).await?;

        let followers_count = self.follows_repo.count_followers(&user.id).await?;
        let following_count = self.follows_repo.count_following(&user.id).await?;
        let posts_count = self.post_repo.count_by_author(&user.id).await?;

        Ok(Profile {
            id: user.id,
            username: user.username,
            name: user.name,
            bio: user.bio,
            image: user.image,
            location: user.location,
            website: user.website,
            created_at: user.created_at,
            followers_count,
            following_count,
            posts_count,
        })
    }

    /// Update the caller's own profile.
    pub async fn update_profile(
        &self,
        subject: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(subject).await?;

        if let Some(username) = &input.username
            && *username != user.username
            && self.user_repo.find_by_username(username).await?.is_some()
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(non_empty(name));
        }
        if let Some(username) = input.username {
            active.username = Set(username);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(non_empty(bio));
        }
        if let Some(location) = input.location {
            active.location = Set(non_empty(location));
        }
        if let Some(website) = input.website {
            active.website = Set(non_empty(website));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Users the subject might want to follow.
    pub async fn suggestions(&self, subject: &str, limit: u64) -> AppResult<Vec<UserSummary>> {
        let users = self.user_repo.find_suggestions(subject, limit).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}
