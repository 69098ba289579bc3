//! Concurrent Cache Module
//!
//! Unbounded cache backed by a sharded concurrent map.

use dashmap::DashMap;

use crate::cache::{check_key, check_value, Cache, CacheKey, CacheStats, CacheValue, StatsRecorder};
use crate::error::Result;

// == Concurrent Cache ==
/// Unbounded cache with no cache-level lock.
///
/// `DashMap` locks one shard per call. Each keyed operation is atomic for
/// its key: a `retrieve` that starts after an `add` of the same key has
/// returned sees that value or a later one.
///
/// `size` and `list_entries` visit the shards one at a time. Under
/// concurrent mutation their results are estimates, not snapshots, and
/// should not drive program logic.
#[derive(Debug)]
pub struct ConcurrentCache<K, V>
where
    K: CacheKey,
{
    entries: DashMap<K, V>,
    stats: StatsRecorder,
}

impl<K: CacheKey, V: CacheValue> ConcurrentCache<K, V> {
    /// Creates an empty cache pre-sized for `initial_capacity` entries.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(initial_capacity),
            stats: StatsRecorder::new(),
        }
    }
}

impl<K: CacheKey, V: CacheValue> Default for ConcurrentCache<K, V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for ConcurrentCache<K, V> {
    fn add(&self, key: K, value: V) -> Result<Option<V>> {
        check_key(&key)?;
        check_value(&value)?;
        Ok(self.entries.insert(key, value))
    }

    fn retrieve(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        // Clone out before the shard guard drops
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        self.stats.record_lookup(&found);
        Ok(found)
    }

    fn invalidate_entry(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        Ok(self.entries.remove(key).map(|(_, value)| value))
    }

    fn clear(&self) {
        self.entries.clear();
    }

    /// Advisory count; not linearizable with concurrent writes.
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn list_entries(&self) -> Vec<(K, V)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.size())
    }
}
