//! Shared TTL cache for expensive upstream work.
//!
//! One [`Cache`] is shared by every request handler. Entries are keyed by a
//! [`CacheKey`], a namespace tag plus a name, so resolved bundles, compile
//! results, documentation pages and sample listings never collide even when
//! their names coincide.
//!
//! # Storage
//!
//! The cache delegates to a [`CacheStore`]. [`MemoryStore`] keeps entries in a
//! [`DashMap`](dashmap::DashMap) with per-entry expiry measured on
//! [`tokio::time::Instant`], so tests can drive expiry with a paused clock.
//!
//! # Compute on miss
//!
//! [`Cache::get_or_compute`] runs the supplied future only on a miss and stores
//! its `Ok` value. An `Err` is handed back to the caller and nothing is
//! stored, so transient upstream failures are retried on the next request.
//! Concurrent misses on the same key may each compute; the last write wins.

pub mod store;

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::constants::{NS_COMPILE, NS_DEPS, NS_DOCS, NS_SAMPLES};

pub use store::{CacheStore, CachedValue, MemoryStore};

/// Kind of value stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Resolved dependency bundles.
    Deps,
    /// Compiler service results.
    Compile,
    /// Proxied documentation files.
    Docs,
    /// Sample project listings.
    Samples,
}

impl Namespace {
    /// Short tag used as the key prefix.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Deps => NS_DEPS,
            Self::Compile => NS_COMPILE,
            Self::Docs => NS_DOCS,
            Self::Samples => NS_SAMPLES,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A namespaced cache key, rendered as `tag:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    name: String,
}

impl CacheKey {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.tag(), self.name)
    }
}

/// Hit/miss counters plus the current entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Typed front end over a shared [`CacheStore`].
///
/// Cloning is cheap and clones share both the store and the counters.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Cache {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            counters: Arc::default(),
        }
    }

    /// Cache backed by a fresh [`MemoryStore`].
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new(max_entries)))
    }

    /// Live value for `key` if it holds a `T`.
    ///
    /// A value of another type under the same key counts as a miss.
    pub fn get<T>(&self, key: &CacheKey) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let found = self.store.get(key).and_then(|value| value.downcast::<T>().ok());
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `value` under `key` and hand back the shared handle.
    pub fn insert<T>(&self, key: CacheKey, value: T, ttl: Option<Duration>) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        let value = Arc::new(value);
        self.store.set(key, Arc::clone(&value) as CachedValue, ttl);
        value
    }

    /// Return the cached `T` for `key`, or run `compute` and cache its `Ok` value.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` fails with. Failures are not cached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            tracing::debug!("Cache hit: {}", key);
            return Ok(hit);
        }

        tracing::debug!("Cache miss: {}", key);
        let value = compute().await?;
        Ok(self.insert(key, value, ttl))
    }

    /// Drop one entry.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.store.remove(key)
    }

    /// Drop every entry. Returns how many were removed.
    pub fn flush(&self) -> usize {
        let flushed = self.store.flush();
        tracing::info!("Flushed {} cache entries", flushed);
        flushed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            entries: self.store.len(),
        }
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("store", &self.store).field("stats", &self.stats()).finish()
    }
}
