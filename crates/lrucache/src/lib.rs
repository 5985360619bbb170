//! # lrucache
//!
//! Bounded, thread-safe key-value cache with least-recently-used eviction.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **Recency list**: doubly-linked slots, front = most recent (O(1) promote/evict)
//! - **Locking**: one `parking_lot::Mutex` guards entries and counters together
//!
//! ```
//! use lrucache::LruCache;
//!
//! let cache = LruCache::new(2).unwrap();
//! cache.put("A", 1);
//! cache.put("B", 2);
//! cache.get("A");
//! cache.put("C", 3); // evicts "B"
//!
//! assert_eq!(cache.keys(), ["C", "A"]);
//! assert_eq!(cache.stats().hits, 1);
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod stats;

pub use cache::LruCache;
pub use error::{Error, Result};
pub use stats::CacheStats;
