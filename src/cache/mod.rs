//! Cache Module
//!
//! In-memory key-value caches sharing one contract and differing in eviction
//! policy and concurrency strategy.
//!
//! | Type | Policy | Guard |
//! |------|--------|-------|
//! | [`LruCache`] | bounded, least recently used evicted on overflow | single exclusive lock |
//! | [`AutoExpiryCache`] | idle entries removed by a background sweeper | reader/writer lock |
//! | [`UnboundedCache`] | none | reader/writer lock |
//! | [`ConcurrentCache`] | none | lock-free concurrent map |

mod absent;
mod bounded;
mod concurrent;
mod entry;
mod expiry;
mod lru;
mod stats;
mod unbounded;


use std::hash::Hash;

use crate::error::Result;

// Re-export public types
pub use absent::Absent;
pub use bounded::LruCache;
pub use concurrent::ConcurrentCache;
pub(crate) use entry::{Clock, ExpiringEntry};
pub use expiry::AutoExpiryCache;
pub(crate) use lru::{NodeId, RecencyList};
pub use stats::CacheStats;
pub(crate) use stats::StatsRecorder;
pub use unbounded::UnboundedCache;

pub(crate) use absent::{check_key, check_value};

// == Key / Value Bounds ==
/// Requirements on cache keys.
pub trait CacheKey: Hash + Eq + Clone + Absent + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Hash + Eq + Clone + Absent + Send + Sync + 'static {}

/// Requirements on cache values. Values are handed out by clone.
pub trait CacheValue: Clone + Absent + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Absent + Send + Sync + 'static {}

// == Cache Facade ==
/// Operation surface shared by every cache variant.
///
/// Keyed operations reject absent keys (and `add` absent values) with
/// [`CacheError::InvalidArgument`](crate::error::CacheError::InvalidArgument)
/// without touching the cache.
pub trait Cache<K: CacheKey, V: CacheValue>: Send + Sync {
    /// Inserts or replaces a mapping, returning the previous value if any.
    ///
    /// Refreshes the entry's recency or access time.
    fn add(&self, key: K, value: V) -> Result<Option<V>>;

    /// Returns the current value for `key`, refreshing its recency or access time.
    fn retrieve(&self, key: &K) -> Result<Option<V>>;

    /// Removes the mapping for `key`, returning the removed value if any.
    fn invalidate_entry(&self, key: &K) -> Result<Option<V>>;

    /// Removes all mappings.
    fn clear(&self);

    /// Number of entries currently held.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Copies every mapping out of the cache. O(n); diagnostics only.
    fn list_entries(&self) -> Vec<(K, V)>;

    /// Snapshot of the cache's counters.
    fn stats(&self) -> CacheStats;
}
