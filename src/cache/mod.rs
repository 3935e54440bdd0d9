//! Generic TTL cache.
//!
//! # Responsibilities
//! - String-keyed store with per-entry expiry
//! - Lazy eviction: expired entries are removed on read, no background sweep
//! - Compute-on-miss convenience for async factories
//!
//! # Design Decisions
//! - `tokio::time::Instant` for expiry so tests drive the clock with
//!   `tokio::time::pause`/`advance`
//! - `get_or_compute` performs no single-flight de-duplication: concurrent
//!   misses on the same key each run their factory and the last write wins.
//!   Callers needing de-duplication must serialize upstream.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A value with its expiry deadline. Owned by the cache that created it.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe TTL cache keyed by string.
#[derive(Clone)]
pub struct TtlCache<V> {
    inner: Arc<DashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache whose `set` uses `default_ttl` unless overridden.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Store a value under the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.inner.insert(key.into(), entry);
    }

    /// Fetch a value, evicting it first if its deadline has passed.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let expired = match self.inner.get(key) {
            Some(entry) if entry.is_expired(now) => true,
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        };
        if expired {
            self.inner.remove(key);
        }
        None
    }

    /// Fetch a cached value or compute and store it.
    ///
    /// On a hit the factory is never invoked. On a miss the factory runs
    /// without holding any map lock, so concurrent misses on one key may
    /// each compute.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Fetch a live entry or atomically insert one built by `make`.
    ///
    /// Unlike [`get_or_compute`](Self::get_or_compute) this holds the key's
    /// shard lock across the check, so concurrent callers observe one
    /// insertion.
    pub fn get_or_insert(&self, key: impl Into<String>, make: impl FnOnce() -> V) -> V {
        let now = Instant::now();
        match self.inner.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(CacheEntry {
                        value: make(),
                        expires_at: now + self.default_ttl,
                    });
                }
                occupied.get().value.clone()
            }
            Entry::Vacant(vacant) => {
                let entry = vacant.insert(CacheEntry {
                    value: make(),
                    expires_at: now + self.default_ttl,
                });
                entry.value.clone()
            }
        }
    }

    /// Update an entry in place, keeping its expiry deadline.
    ///
    /// Returns false if the key is absent or expired.
    pub fn update(&self, key: &str, f: impl FnOnce(&mut V)) -> bool {
        let now = Instant::now();
        match self.inner.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                f(&mut entry.value);
                true
            }
            _ => false,
        }
    }

    /// Remove an entry regardless of expiry.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.remove(key).map(|(_, entry)| entry.value)
    }

    /// Snapshot of all non-expired pairs, filtered lazily at call time.
    ///
    /// Expired entries are skipped but left in place for `get` to evict.
    pub fn entries(&self) -> Vec<(String, V)> {
        let now = Instant::now();
        self.inner
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| (entry.key().clone(), entry.value().value.clone()))
            .collect()
    }

    /// Number of entries currently stored, expired included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.inner.clear();
    }
}
