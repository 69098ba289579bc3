//! Unbounded Cache Module
//!
//! Plain hash map behind a reader/writer lock.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cache::{check_key, check_value, Cache, CacheKey, CacheStats, CacheValue, StatsRecorder};
use crate::error::Result;

// == Unbounded Cache ==
/// Unbounded cache for read-heavy workloads.
///
/// `retrieve` and `size` share a read lock so readers never block each other;
/// `add`, `invalidate_entry` and `clear` take the write lock. A waiting writer
/// blocks new readers, so writers are not starved.
#[derive(Debug)]
pub struct UnboundedCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
    stats: StatsRecorder,
}

impl<K: CacheKey, V: CacheValue> UnboundedCache<K, V> {
    /// Creates an empty cache pre-sized for `initial_capacity` entries.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(initial_capacity)),
            stats: StatsRecorder::new(),
        }
    }
}

impl<K: CacheKey, V: CacheValue> Default for UnboundedCache<K, V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for UnboundedCache<K, V> {
    fn add(&self, key: K, value: V) -> Result<Option<V>> {
        check_key(&key)?;
        check_value(&value)?;
        Ok(self.entries.write().insert(key, value))
    }

    fn retrieve(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        let found = self.entries.read().get(key).cloned();
        self.stats.record_lookup(&found);
        Ok(found)
    }

    fn invalidate_entry(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        Ok(self.entries.write().remove(key))
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn size(&self) -> usize {
        self.entries.read().len()
    }

    /// Copies entries under the read lock, in no particular order.
    fn list_entries(&self) -> Vec<(K, V)> {
        self.entries
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.size())
    }
}
