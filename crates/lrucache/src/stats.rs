//! Cache statistics snapshot

/// Point-in-time cache statistics.
///
/// All counters are read under the cache lock in one step, so the
/// derived rates always agree with the counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CacheStats {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that did not find their key
    pub misses: u64,
    /// Entries dropped to make room for new keys
    pub evictions: u64,
}

impl CacheStats {
    /// Total number of counted lookups
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate as a percentage (0.0 to 100.0), 0.0 before any access
    pub fn hit_rate(&self) -> f64 {
        self.hit_ratio() * 100.0
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
