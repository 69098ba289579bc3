//! Bounded LRU Cache Module
//!
//! Fixed-capacity cache that evicts the least recently used entry on overflow.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{
    check_key, check_value, Cache, CacheKey, CacheStats, CacheValue, NodeId, RecencyList,
    StatsRecorder,
};
use crate::error::{CacheError, Result};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    node: NodeId,
}

#[derive(Debug)]
struct LruState<K, V> {
    /// Key-value storage
    entries: HashMap<K, Slot<V>>,
    /// Access order
    recency: RecencyList<K>,
}

// == LRU Cache ==
/// Fixed-capacity LRU cache.
///
/// Every operation, reads included, takes the same exclusive lock: a read
/// moves the entry to the front of the recency list, so there is no
/// read-only path. Eviction happens inside the critical section of the `add`
/// that overflowed, so no caller ever observes more than `max_capacity`
/// entries.
#[derive(Debug)]
pub struct LruCache<K, V> {
    state: Mutex<LruState<K, V>>,
    max_capacity: usize,
    stats: StatsRecorder,
}

impl<K: CacheKey, V: CacheValue> LruCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_capacity` entries.
    ///
    /// Fails with `InvalidArgument` when `max_capacity` is zero.
    pub fn new(max_capacity: usize) -> Result<Self> {
        if max_capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "Max capacity must be positive".to_string(),
            ));
        }

        Ok(Self {
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                recency: RecencyList::new(),
            }),
            max_capacity,
            stats: StatsRecorder::new(),
        })
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for LruCache<K, V> {
    // == Add ==
    /// Overwrites and promotes an existing key, or inserts a new key at the
    /// front and evicts the oldest entry if capacity is exceeded.
    fn add(&self, key: K, value: V) -> Result<Option<V>> {
        check_key(&key)?;
        check_value(&value)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(slot) = state.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut slot.value, value);
            state.recency.touch(slot.node);
            return Ok(Some(previous));
        }

        let node = state.recency.push_front(key.clone());
        state.entries.insert(key, Slot { value, node });

        if state.entries.len() > self.max_capacity {
            if let Some(oldest) = state.recency.evict_oldest() {
                state.entries.remove(&oldest);
                self.stats.record_eviction();
                debug!(
                    max_capacity = self.max_capacity,
                    "Evicted least recently used entry"
                );
            }
        }
        debug_assert_eq!(state.recency.len(), state.entries.len());

        Ok(None)
    }

    // == Retrieve ==
    fn retrieve(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let found = match state.entries.get(key) {
            Some(slot) => {
                state.recency.touch(slot.node);
                Some(slot.value.clone())
            }
            None => None,
        };

        self.stats.record_lookup(&found);
        Ok(found)
    }

    // == Invalidate ==
    fn invalidate_entry(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        Ok(state.entries.remove(key).map(|slot| {
            state.recency.remove(slot.node);
            slot.value
        }))
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }

    fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Lists entries from least to most recently used, under the lock.
    fn list_entries(&self) -> Vec<(K, V)> {
        let state = self.state.lock();
        state
            .recency
            .iter_oldest_first()
            .filter_map(|key| {
                state
                    .entries
                    .get(key)
                    .map(|slot| (key.clone(), slot.value.clone()))
            })
            .collect()
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.size())
    }
}
