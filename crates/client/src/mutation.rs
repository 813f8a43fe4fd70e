//! Snapshot, speculative write, commit or rollback.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheKey, CacheStore};

/// Receipt for an optimistic write, handed back to [`OptimisticMutation::commit`]
/// or [`OptimisticMutation::rollback`].
#[derive(Debug)]
#[must_use = "an optimistic write must be committed or rolled back"]
pub struct MutationTicket<V> {
    key: CacheKey,
    snapshot: Option<V>,
    sequence: u64,
}

impl<V> MutationTicket<V> {
    /// The key this write touched.
    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.key
    }

    /// The cached value before the write.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&V> {
        self.snapshot.as_ref()
    }
}

/// Optimistic writes against a [`CacheStore`].
///
/// Only the most recent ticket per key is trusted: once a second write begins
/// on a key, commits and rollbacks of the earlier ticket are ignored.
pub struct OptimisticMutation<V> {
    store: CacheStore<V>,
    latest: Arc<Mutex<HashMap<CacheKey, u64>>>,
    next_sequence: Arc<Mutex<u64>>,
}

impl<V> Clone for OptimisticMutation<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            latest: Arc::clone(&self.latest),
            next_sequence: Arc::clone(&self.next_sequence),
        }
    }
}

impl<V: Clone> OptimisticMutation<V> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: CacheStore<V>) -> Self {
        Self {
            store,
            latest: Arc::new(Mutex::new(HashMap::new())),
            next_sequence: Arc::new(Mutex::new(0)),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &CacheStore<V> {
        &self.store
    }

    /// Cancel any refetch for `key`, snapshot its value and write `speculate(snapshot)`.
    ///
    /// Nothing is written when the key has no cached value.
    pub fn begin(&self, key: CacheKey, speculate: impl FnOnce(&V) -> V) -> MutationTicket<V> {
        self.store.cancel_refetch(&key);

        let snapshot = self.store.peek(&key);
        if let Some(ref current) = snapshot {
            self.store.set(key.clone(), speculate(current));
        }

        let sequence = {
            let mut next = self.next_sequence.lock();
            let sequence = *next;
            *next += 1;
            sequence
        };
        self.latest.lock().insert(key.clone(), sequence);

        MutationTicket {
            key,
            snapshot,
            sequence,
        }
    }

    /// Settle a successful write, replacing the speculative value with `confirmed`.
    ///
    /// Returns `false` if a newer write superseded this ticket, in which case
    /// the cache is left alone.
    pub fn commit(&self, ticket: MutationTicket<V>, confirmed: Option<V>) -> bool {
        if !self.settle(&ticket) {
            return false;
        }
        if let Some(value) = confirmed {
            self.store.set(ticket.key, value);
        }
        true
    }

    /// Restore the snapshot taken by [`Self::begin`].
    ///
    /// Returns `false` if a newer write superseded this ticket; its snapshot
    /// then wins and this one is dropped.
    pub fn rollback(&self, ticket: MutationTicket<V>) -> bool {
        if !self.settle(&ticket) {
            tracing::debug!(key = %ticket.key, "Skipped superseded rollback");
            return false;
        }
        match ticket.snapshot {
            Some(value) => self.store.set(ticket.key, value),
            None => {
                self.store.remove(&ticket.key);
            }
        }
        true
    }

    /// Whether `ticket` is still the latest for its key.
    #[must_use]
    pub fn is_latest(&self, ticket: &MutationTicket<V>) -> bool {
        self.latest.lock().get(&ticket.key) == Some(&ticket.sequence)
    }

    fn settle(&self, ticket: &MutationTicket<V>) -> bool {
        let mut latest = self.latest.lock();
        if latest.get(&ticket.key) == Some(&ticket.sequence) {
            latest.remove(&ticket.key);
            true
        } else {
            false
        }
    }
}
