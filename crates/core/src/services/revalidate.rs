//! Page-cache revalidation hints.
//!
//! After a mutation the server tells rendering layers which paths are now stale. Services
//! depend on the [`Revalidator`] trait only; the API wires in [`BroadcastRevalidator`] and
//! streams hints to subscribers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// A path whose rendered output is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidationHint {
    /// Path to revalidate, e.g. `/` or `/profile/alice`.
    pub path: String,
}

impl RevalidationHint {
    /// Hint for a path.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Hint for the home feed.
    #[must_use]
    pub fn home() -> Self {
        Self::path("/")
    }

    /// Hint for a user's profile page.
    #[must_use]
    pub fn profile(username: &str) -> Self {
        Self::path(format!("/profile/{username}"))
    }
}

/// Sink for revalidation hints.
pub trait Revalidator: Send + Sync {
    /// Emit a hint. Never fails; a hint nobody hears is dropped.
    fn revalidate(&self, hint: RevalidationHint);
}

/// A no-op implementation for tests or when nothing consumes hints.
#[derive(Clone, Default)]
pub struct NoOpRevalidator;

impl Revalidator for NoOpRevalidator {
    fn revalidate(&self, _hint: RevalidationHint) {}
}

/// Fans hints out over a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastRevalidator {
    sender: broadcast::Sender<RevalidationHint>,
}

impl BroadcastRevalidator {
    /// Create a revalidator buffering up to `capacity` hints per slow subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future hints.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RevalidationHint> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastRevalidator {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Revalidator for BroadcastRevalidator {
    fn revalidate(&self, hint: RevalidationHint) {
        tracing::debug!(path = %hint.path, "Revalidation hint");
        // Err only means there are no subscribers right now.
        let _ = self.sender.send(hint);
    }
}

/// Shared trait object handed to services.
pub type RevalidatorService = Arc<dyn Revalidator>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let revalidator = BroadcastRevalidator::new(8);
        let mut rx = revalidator.subscribe();

        revalidator.revalidate(RevalidationHint::profile("alice"));

        let hint = rx.recv().await.unwrap();
        assert_eq!(hint.path, "/profile/alice");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_silent() {
        let revalidator = BroadcastRevalidator::default();
        revalidator.revalidate(RevalidationHint::home());
    }
}
