//! Cache statistics tracking

/// Counters describing how a cache has been used
///
/// The cache owns its counters and updates them on every `get`/`put`;
/// callers read a copy through `LruCache::stats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    inserts: u64,
    updates: u64,
    evictions: u64,
}

impl CacheStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// `get` calls that found the key
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// `get` calls that missed
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// `put` calls that admitted a new key
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// `put` calls that overwrote a resident key
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Entries dropped to make room for new keys
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
