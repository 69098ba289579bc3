//! Diagnostics
//!
//! Dumps cache contents to the log. Copies every entry, so keep it out of
//! hot paths.

use std::fmt::Debug;

use tracing::{debug, info};

use crate::cache::{Cache, CacheKey, CacheValue};

/// Logs every entry of `cache` at debug level and returns how many were listed.
///
/// The listing follows the variant's `list_entries`: recency order for the LRU
/// cache, arbitrary order otherwise, and no point-in-time guarantee for the
/// concurrent cache.
pub fn log_entries<K, V, C>(label: &str, cache: &C) -> usize
where
    K: CacheKey + Debug,
    V: CacheValue + Debug,
    C: Cache<K, V> + ?Sized,
{
    let entries = cache.list_entries();
    info!(cache = label, count = entries.len(), "Cache entries");
    for (key, value) in &entries {
        debug!(cache = label, ?key, ?value, "Cache entry");
    }
    entries.len()
}
