//! In-process TTL cache backed by DashMap for lock-free concurrent access.
//! Holds upstream report results for a short window so repeated dashboard
//! loads do not hit the reporting API.

use crate::clock::{Clock, SystemClock};
use crate::ReportCache;
use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Key/value store with per-entry expiry.
///
/// There is no locking around a miss: two callers missing the same key will
/// both fetch and both write, the last write wins.
pub struct LocalCache<K, V, C = SystemClock> {
    store: DashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
    max_entries: usize,
    clock: C,
}

impl<K, V> LocalCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self::with_clock(Duration::from_secs(ttl_secs), max_entries, SystemClock)
    }
}

impl<K, V, C> LocalCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    pub fn with_clock(default_ttl: Duration, max_entries: usize, clock: C) -> Self {
        Self {
            store: DashMap::new(),
            default_ttl,
            max_entries,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a value, returns None if expired or missing.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entry = self.store.get(key)?;
        if entry.is_expired(now) {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert with the cache-wide TTL.
    pub fn put(&self, key: K, value: V) {
        self.insert(key, value, self.default_ttl);
    }

    /// Insert or replace an entry. Once the store grows past `max_entries`
    /// the expired entries are swept.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        self.store.insert(
            key,
            CacheEntry {
                value,
                inserted_at: self.clock.now(),
                ttl,
            },
        );
        if self.store.len() > self.max_entries {
            let evicted = self.evict_expired();
            debug!(
                evicted = evicted,
                size = self.store.len(),
                "Cache over capacity, swept expired entries"
            );
        }
    }

    /// Remove expired entries. Also called periodically from a background task.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired(now));
        before - self.store.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<K, V, C> ReportCache<K, V> for LocalCache<K, V, C>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
    C: Clock,
{
    fn get(&self, key: &K) -> Option<V> {
        let value = LocalCache::get(self, key);
        if value.is_some() {
            metrics::counter!("cache.report.hit").increment(1);
        } else {
            metrics::counter!("cache.report.miss").increment(1);
        }
        value
    }

    fn set(&self, key: K, value: V, ttl: Duration) {
        self.insert(key, value, ttl);
    }
}
