//! The single entry point behind every follow, like and save button.

use std::sync::Arc;

use buzzify_common::RelationKind;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::actions::ServerActions;
use crate::cache::{CacheKey, CacheStore, ToggleView};
use crate::error::ActionError;
use crate::mutation::OptimisticMutation;
use crate::notify::{Notification, Notifier};

/// Runs toggle actions optimistically.
#[derive(Clone)]
pub struct ToggleController {
    actions: Arc<dyn ServerActions>,
    mutation: OptimisticMutation<ToggleView>,
    notifier: Arc<dyn Notifier>,
    subject: Option<String>,
}

impl ToggleController {
    /// Create a controller with no signed-in user.
    #[must_use]
    pub fn new(
        actions: Arc<dyn ServerActions>,
        store: CacheStore<ToggleView>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            actions,
            mutation: OptimisticMutation::new(store),
            notifier,
            subject: None,
        }
    }

    /// Set the signed-in user.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Change the signed-in user, or sign out with `None`.
    pub fn set_subject(&mut self, subject: Option<String>) {
        self.subject = subject;
    }

    /// The cache the buttons render from.
    #[must_use]
    pub const fn store(&self) -> &CacheStore<ToggleView> {
        self.mutation.store()
    }

    /// Current view for a toggle, fetching it from the server when absent or stale.
    pub async fn view(
        &self,
        kind: RelationKind,
        target_id: &str,
    ) -> Result<Option<ToggleView>, ActionError> {
        let key = CacheKey::for_toggle(kind, target_id);
        let actions = Arc::clone(&self.actions);
        self.store()
            .get_or_fetch(&key, || async move { actions.fetch_view(kind, target_id).await })
            .await
    }

    /// Follower count of a user, refetched once a follow toggle has invalidated it.
    pub async fn follower_count(&self, user_id: &str) -> Result<Option<u64>, ActionError> {
        let key = CacheKey::follower_count(user_id);
        let actions = Arc::clone(&self.actions);
        let view = self
            .store()
            .get_or_fetch(&key, || async move { actions.fetch_follower_count(user_id).await })
            .await?;
        Ok(view.and_then(|v| v.count))
    }

    /// Flip a relation.
    ///
    /// Rejections that need no server round trip (no signed-in user, following
    /// yourself) return immediately without touching the cache. Otherwise the
    /// flipped view is written right away and the server action runs in the
    /// background; the returned handle resolves once it has been committed or
    /// rolled back.
    ///
    /// There is nothing to flip when the view was never loaded, so the button only
    /// changes once the server view is committed. Read it through [`Self::view`]
    /// first to get the optimistic update.
    pub fn trigger(
        &self,
        kind: RelationKind,
        target_id: &str,
    ) -> Result<JoinHandle<Result<ToggleView, ActionError>>, ActionError> {
        let subject = self.subject.as_deref().ok_or(ActionError::Unauthenticated)?;
        if kind == RelationKind::Follow && subject == target_id {
            return Err(ActionError::InvalidOperation(
                "You cannot follow yourself".to_string(),
            ));
        }

        let key = CacheKey::for_toggle(kind, target_id);
        let ticket = self.mutation.begin(key, |view| view.flipped());
        debug!(kind = %kind, target_id, "Applied optimistic toggle");

        let actions = Arc::clone(&self.actions);
        let mutation = self.mutation.clone();
        let notifier = Arc::clone(&self.notifier);
        let target_id = target_id.to_string();

        Ok(tokio::spawn(async move {
            match actions.toggle(kind, &target_id).await {
                Ok(view) => {
                    mutation.commit(ticket, Some(view));
                    if kind == RelationKind::Follow {
                        mutation
                            .store()
                            .invalidate(&CacheKey::follower_count(&target_id));
                    }
                    Ok(view)
                }
                Err(err) => {
                    warn!(kind = %kind, target_id = %target_id, error = %err, "Toggle failed, rolling back");
                    mutation.rollback(ticket);
                    notifier.notify(Notification::error(failure_message(kind, &err)));
                    Err(err)
                }
            }
        }))
    }
}

fn failure_message(kind: RelationKind, err: &ActionError) -> String {
    match err {
        ActionError::Unauthenticated => err.to_string(),
        ActionError::InvalidOperation(message) | ActionError::NotFound(message) => message.clone(),
        ActionError::TransientFailure(_) => match kind {
            RelationKind::Follow => "Failed to update follow status".to_string(),
            RelationKind::Like => "Failed to update like".to_string(),
            RelationKind::Save => "Failed to update saved posts".to_string(),
        },
    }
}
