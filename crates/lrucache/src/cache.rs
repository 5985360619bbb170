//! Thread-safe LRU cache

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::lru::RecencyList;
use crate::stats::CacheStats;

/// Bounded key-value cache with least-recently-used eviction.
///
/// Every operation takes the same per-instance lock for its whole
/// duration, so concurrent callers observe some serial order of
/// operations. Share it between threads with `Arc`.
pub struct LruCache<K, V> {
    /// Entries and counters, always mutated together
    inner: Mutex<Inner<K, V>>,

    /// Fixed at construction
    capacity: usize,
}

struct Inner<K, V> {
    entries: RecencyList<K, V>,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new cache holding at most `capacity` entries
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "capacity must be positive".to_string(),
            ));
        }

        debug!(capacity, "creating LRU cache");

        Ok(Self {
            inner: Mutex::new(Inner {
                entries: RecencyList::new(capacity),
                stats: CacheStats::default(),
            }),
            capacity,
        })
    }

    /// Get a copy of the value for `key`, marking it most recently used.
    ///
    /// Counts a hit when found and a miss otherwise.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        let Inner { entries, stats } = &mut *inner;

        match entries.get(key) {
            Some(value) => {
                stats.record_hit();
                Some(value.clone())
            }
            None => {
                stats.record_miss();
                None
            }
        }
    }

    /// Like [`get`](Self::get), but a missing key is an error
    ///
    /// # Errors
    /// * `Error::KeyNotFound` - `key` is not cached
    pub fn try_get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.get(key)
            .ok_or_else(|| Error::KeyNotFound(format!("{:?}", key)))
    }

    /// Get a copy of the value without promoting it or touching the counters
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.peek(key).cloned()
    }

    /// Check for `key` without promoting it or touching the counters
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.contains(key)
    }

    /// Insert or update a value and mark it most recently used.
    ///
    /// Updating an existing key never evicts. Inserting a new key into a
    /// full cache evicts the least recently used entry, which is returned.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let mut inner = self.inner.lock();
        let evicted = inner.entries.put(key, value);

        if evicted.is_some() {
            inner.stats.record_eviction();
            trace!(capacity = self.capacity, "evicted least recently used entry");
        }

        evicted
    }

    /// Remove `key`, returning whether it was present. Counters are untouched.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.stats.reset();

        debug!(dropped, "cleared LRU cache");
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit rate as a percentage (0.0 to 100.0), 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    /// Consistent snapshot of hits, misses and evictions
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    /// Keys ordered from most to least recently used
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Walk the whole structure and verify that the key index and the
    /// recency order describe the same entries. O(n), for diagnostics.
    pub fn is_consistent(&self) -> bool {
        let inner = self.inner.lock();
        inner.entries.len() <= self.capacity
            && inner.entries.capacity() == self.capacity
            && inner.entries.check()
    }
}

impl<K, V> fmt::Display for LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        let stats = inner.stats;

        writeln!(
            f,
            "LruCache<{}, {}>",
            std::any::type_name::<K>(),
            std::any::type_name::<V>()
        )?;
        writeln!(f, "Size: {}/{}", inner.entries.len(), self.capacity)?;
        writeln!(f, "Hits: {} | Misses: {}", stats.hits, stats.misses)?;
        writeln!(f, "Hit Rate: {:.1}%", stats.hit_rate())?;
        writeln!(f, "Entries (most to least recent):")?;

        for (key, value) in inner.entries.iter() {
            writeln!(f, "  [{:?}] = {:?}", key, value)?;
        }

        Ok(())
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &inner.entries.len())
            .field("capacity", &self.capacity)
            .field("stats", &inner.stats)
            .finish()
    }
}
