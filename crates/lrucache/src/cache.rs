//! Fixed-capacity key/value cache with LRU eviction

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::recency::RecencyList;
use crate::stats::CacheStats;

/// Key/value cache holding at most `capacity` entries
///
/// Values live in `store`; recency order lives in `order`. Both always hold
/// exactly the same key set.
pub struct LruCache<K, V> {
    store: HashMap<K, V, RandomState>,
    order: RecencyList<K>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new cache with the given capacity
    ///
    /// # Errors
    /// * `Error::InvalidCapacity` - `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        debug!(capacity, "creating LRU cache");

        Ok(Self {
            store: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            order: RecencyList::with_capacity(capacity),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Get a value and mark `key` as most recently used
    ///
    /// A miss returns `None` and leaves the entries and their order untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.store.contains_key(key) {
            self.stats.record_miss();
            return None;
        }

        in_sync(self.order.touch(key));
        self.stats.record_hit();
        self.store.get(key)
    }

    /// Insert or overwrite a value and mark `key` as most recently used
    ///
    /// Admitting a new key into a full cache first evicts exactly one entry,
    /// the least recently used. Overwriting never evicts.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(slot) = self.store.get_mut(&key) {
            *slot = value;
            in_sync(self.order.touch(&key));
            self.stats.record_update();
            return;
        }

        if self.store.len() == self.capacity {
            self.evict();
        }

        in_sync(self.order.add(key.clone()));
        self.store.insert(key, value);
        self.stats.record_insert();
    }

    /// Get a value without changing its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.store.get(key)
    }

    /// Check whether `key` is resident, without changing its recency
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    /// Key that the next over-capacity `put` will evict
    pub fn lru_key(&self) -> Option<&K> {
        self.order.peek_lru()
    }

    /// Iterate entries from least to most recently used
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.store.get_key_value(key))
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the usage counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry (statistics are kept)
    pub fn clear(&mut self) {
        self.store.clear();
        self.order.clear();
    }

    fn evict(&mut self) {
        let lru_key = in_sync(self.order.remove_lru());
        self.store.remove(&lru_key);
        self.stats.record_eviction();
        trace!(len = self.store.len(), capacity = self.capacity, "evicted LRU entry");
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.order.assert_consistent();
        assert!(self.store.len() <= self.capacity);
        assert_eq!(self.store.len(), self.order.len());
        assert!(self.order.iter().all(|key| self.store.contains_key(key)));
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Unwrap a recency list result that the cache's own membership checks
/// guarantee. An error here means `store` and `order` have diverged.
fn in_sync<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("LRU bookkeeping out of sync: {}", err),
    }
}
