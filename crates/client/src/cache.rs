//! Typed cache of toggle views.
//!
//! Every entry is addressed by a [`CacheKey`] built from one constructor per
//! view. Entries age out after the store's TTL or when explicitly
//! invalidated; a stale entry stays readable through [`CacheStore::peek`] so
//! buttons keep rendering while a refetch runs.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use buzzify_common::RelationKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Which projection a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    /// Whether the viewer follows a user.
    FollowStatus,
    /// Like count of a post and whether the viewer liked it.
    LikeInfo,
    /// Whether the viewer saved a post.
    SaveStatus,
    /// Follower count of a user.
    FollowerCount,
}

impl ViewKind {
    /// The view a toggle of `kind` flips.
    #[must_use]
    pub const fn for_relation(kind: RelationKind) -> Self {
        match kind {
            RelationKind::Follow => Self::FollowStatus,
            RelationKind::Like => Self::LikeInfo,
            RelationKind::Save => Self::SaveStatus,
        }
    }
}

/// Composite cache key: view kind plus target id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: ViewKind,
    id: String,
}

impl CacheKey {
    /// Follow status of `user_id`.
    #[must_use]
    pub fn follow_status(user_id: impl Into<String>) -> Self {
        Self {
            kind: ViewKind::FollowStatus,
            id: user_id.into(),
        }
    }

    /// Like info of `post_id`.
    #[must_use]
    pub fn like_info(post_id: impl Into<String>) -> Self {
        Self {
            kind: ViewKind::LikeInfo,
            id: post_id.into(),
        }
    }

    /// Save status of `post_id`.
    #[must_use]
    pub fn save_status(post_id: impl Into<String>) -> Self {
        Self {
            kind: ViewKind::SaveStatus,
            id: post_id.into(),
        }
    }

    /// Follower count of `user_id`.
    #[must_use]
    pub fn follower_count(user_id: impl Into<String>) -> Self {
        Self {
            kind: ViewKind::FollowerCount,
            id: user_id.into(),
        }
    }

    /// Key of the view a toggle of `kind` on `target_id` flips.
    #[must_use]
    pub fn for_toggle(kind: RelationKind, target_id: impl Into<String>) -> Self {
        Self {
            kind: ViewKind::for_relation(kind),
            id: target_id.into(),
        }
    }

    /// The view kind.
    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        self.kind
    }

    /// The target id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.id)
    }
}

/// What a toggle button renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleView {
    /// The relation exists.
    pub active: bool,
    /// Aggregate count, for views that show one.
    pub count: Option<u64>,
}

impl ToggleView {
    /// A view without a count.
    #[must_use]
    pub const fn status(active: bool) -> Self {
        Self {
            active,
            count: None,
        }
    }

    /// A view with a count.
    #[must_use]
    pub const fn counted(active: bool, count: u64) -> Self {
        Self {
            active,
            count: Some(count),
        }
    }

    /// The view after flipping the relation. The count moves with the flag
    /// and never drops below zero.
    #[must_use]
    pub const fn flipped(self) -> Self {
        let active = !self.active;
        let count = match self.count {
            Some(n) if active => Some(n.saturating_add(1)),
            Some(n) => Some(n.saturating_sub(1)),
            None => None,
        };
        Self { active, count }
    }
}

struct Entry<V> {
    value: V,
    written_at: Instant,
    stale: bool,
}

struct Refetch {
    generation: u64,
    token: CancellationToken,
}

struct Inner<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    refetches: HashMap<CacheKey, Refetch>,
    next_generation: u64,
}

/// Process-local view cache.
pub struct CacheStore<V = ToggleView> {
    inner: Arc<RwLock<Inner<V>>>,
    ttl: Duration,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone> CacheStore<V> {
    /// Create an empty store whose entries stay fresh for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                refetches: HashMap::new(),
                next_generation: 0,
            })),
            ttl,
        }
    }

    /// The fresh value for `key`, or `None` if absent, expired or invalidated.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let inner = self.inner.read();
        let entry = inner.entries.get(key)?;
        self.is_fresh(entry).then(|| entry.value.clone())
    }

    /// The last known value for `key`, fresh or not.
    #[must_use]
    pub fn peek(&self, key: &CacheKey) -> Option<V> {
        self.inner.read().entries.get(key).map(|e| e.value.clone())
    }

    /// Write a value. Used both by optimistic writes and by confirmed fetches.
    pub fn set(&self, key: CacheKey, value: V) {
        self.inner.write().entries.insert(
            key,
            Entry {
                value,
                written_at: Instant::now(),
                stale: false,
            },
        );
    }

    /// Mark `key` stale so the next read refetches. Returns whether an entry existed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut inner = self.inner.write();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `key`.
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.inner.write().entries.remove(key).map(|e| e.value)
    }

    /// Cancel the refetch in flight for `key`, if any. Its response will be discarded.
    pub fn cancel_refetch(&self, key: &CacheKey) -> bool {
        match self.inner.write().refetches.remove(key) {
            Some(refetch) => {
                refetch.token.cancel();
                tracing::trace!(key = %key, "Cancelled refetch");
                true
            }
            None => false,
        }
    }

    /// Whether a refetch is registered for `key`.
    #[must_use]
    pub fn is_refetching(&self, key: &CacheKey) -> bool {
        self.inner.read().refetches.contains_key(key)
    }

    /// Return the fresh value for `key`, fetching it when absent or stale.
    ///
    /// A fetch started here can be cancelled with [`Self::cancel_refetch`];
    /// the cached value at that moment is returned and the late response is
    /// never written. Starting a fetch cancels any earlier one for the same key.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &CacheKey, fetch: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(Some(value));
        }

        let (generation, token) = self.register_refetch(key);

        let fetched = tokio::select! {
            () = token.cancelled() => None,
            result = fetch() => Some(result),
        };

        let Some(result) = fetched else {
            return Ok(self.peek(key));
        };

        let mut inner = self.inner.write();
        let current = inner
            .refetches
            .get(key)
            .is_some_and(|r| r.generation == generation);
        if !current {
            // Superseded while the response was in flight.
            return Ok(inner.entries.get(key).map(|e| e.value.clone()));
        }
        inner.refetches.remove(key);

        let value = result?;
        inner.entries.insert(
            key.clone(),
            Entry {
                value: value.clone(),
                written_at: Instant::now(),
                stale: false,
            },
        );
        Ok(Some(value))
    }

    fn register_refetch(&self, key: &CacheKey) -> (u64, CancellationToken) {
        let mut inner = self.inner.write();
        let generation = inner.next_generation;
        inner.next_generation += 1;

        let token = CancellationToken::new();
        let previous = inner.refetches.insert(
            key.clone(),
            Refetch {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        (generation, token)
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        !entry.stale && entry.written_at.elapsed() < self.ttl
    }
}
