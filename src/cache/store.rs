//! Backing stores for the shared cache.
//!
//! A store holds type-erased values with an optional expiry. It is the only
//! mutable state shared between requests, so implementations must tolerate
//! concurrent `get`/`set` on the same key; last writer wins.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use super::CacheKey;

/// A cached value. Callers downcast to the concrete type they stored.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Key/value store with per-entry lifetimes.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Live value for `key`. An expired entry is reported as absent.
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;

    /// Store `value`, replacing any previous entry. `None` never expires.
    fn set(&self, key: CacheKey, value: CachedValue, ttl: Option<Duration>);

    /// Drop one entry. Returns whether a live entry was removed.
    fn remove(&self, key: &CacheKey) -> bool;

    /// Drop every entry. Returns how many were removed.
    fn flush(&self) -> usize;

    /// Number of stored entries, expired ones included until they are purged.
    fn len(&self) -> usize;

    /// Whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    value: CachedValue,
    inserted_at: Instant,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// In-process store on a [`DashMap`], bounded by an entry count.
///
/// When an insert pushes the store past `max_entries`, expired entries are
/// purged first, then the oldest insertions are evicted in one pass down to
/// 90% of capacity, so a full store does not rescan on every insert.
pub struct MemoryStore {
    entries: DashMap<CacheKey, Entry>,
    max_entries: usize,
}

impl MemoryStore {
    /// Create an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Entry count that eviction trims down to: 90% of capacity.
    fn low_water(&self) -> usize {
        self.max_entries - self.max_entries / 10
    }

    fn enforce_capacity(&self) {
        if self.entries.len() <= self.max_entries {
            return;
        }

        let purged = self.purge_expired();
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
        if self.entries.len() <= self.max_entries {
            return;
        }

        // Collect first; removing while iterating would deadlock the shard.
        let mut by_age: Vec<(Instant, CacheKey)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().inserted_at, entry.key().clone()))
            .collect();
        let excess = by_age.len().saturating_sub(self.low_water());
        if excess == 0 {
            return;
        }
        if excess < by_age.len() {
            by_age.select_nth_unstable_by_key(excess, |(inserted_at, _)| *inserted_at);
        }

        for (_, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        tracing::debug!("Evicted {} oldest cache entries", excess);
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(Arc::clone(&entry.value)),
            Some(_) => true,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        None
    }

    fn set(&self, key: CacheKey, value: CachedValue, ttl: Option<Duration>) {
        let inserted_at = Instant::now();
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at,
                expires_at: ttl.map(|ttl| inserted_at + ttl),
            },
        );
        self.enforce_capacity();
    }

    fn remove(&self, key: &CacheKey) -> bool {
        let now = Instant::now();
        self.entries.remove(key).is_some_and(|(_, entry)| !entry.is_expired(now))
    }

    fn flush(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
