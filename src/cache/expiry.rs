//! Auto-Expiry Cache Module
//!
//! Unbounded cache whose idle entries are removed by a background sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::cache::{
    check_key, check_value, Cache, CacheKey, CacheStats, CacheValue, Clock, ExpiringEntry,
    StatsRecorder,
};
use crate::error::{CacheError, Result};
use crate::tasks::{Sweepable, SweeperHandle};

// == Expiry Store ==
/// Entry store and expiry policy shared between the cache and its sweeper.
#[derive(Debug)]
pub(crate) struct ExpiryStore<K, V> {
    entries: RwLock<HashMap<K, ExpiringEntry<V>>>,
    window: Duration,
    clock: Clock,
    stats: StatsRecorder,
}

impl<K: CacheKey, V: CacheValue> ExpiryStore<K, V> {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            window,
            clock: Clock::new(),
            stats: StatsRecorder::new(),
        }
    }

    pub(crate) fn add(&self, key: K, value: V) -> Option<V> {
        let entry = ExpiringEntry::new(value, self.clock.now_nanos());
        self.entries
            .write()
            .insert(key, entry)
            .map(|previous| previous.value)
    }

    /// Reads under shared access and refreshes the entry's timestamp.
    ///
    /// Never checks expiry: an overdue entry stays visible until the next sweep.
    pub(crate) fn retrieve(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        let found = entries.get(key).map(|entry| {
            entry.touch(self.clock.now_nanos());
            entry.value.clone()
        });
        self.stats.record_lookup(&found);
        found
    }

    pub(crate) fn invalidate(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key).map(|entry| entry.value)
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn list(&self) -> Vec<(K, V)> {
        self.entries
            .read()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Sweep ==
    /// Removes every entry idle for at least the expiry window.
    ///
    /// Holds the write lock for the whole O(n) scan. Fails with `LockTimeout`
    /// if the lock cannot be taken within `lock_timeout`.
    pub(crate) fn sweep_expired(&self, lock_timeout: Duration) -> Result<usize> {
        let mut entries = self.entries.try_write_for(lock_timeout).ok_or_else(|| {
            CacheError::LockTimeout(format!(
                "Expiry sweep could not acquire write access within {}ms",
                lock_timeout.as_millis()
            ))
        })?;

        let now = self.clock.now_nanos();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.window));
        let removed = before - entries.len();

        self.stats.record_expirations(removed);
        debug!(before, after = entries.len(), "Expiry sweep complete");
        Ok(removed)
    }
}

impl<K: CacheKey, V: CacheValue> Sweepable for ExpiryStore<K, V> {
    fn sweep(&self) -> Result<usize> {
        self.sweep_expired(self.window)
    }
}

// == Auto-Expiry Cache ==
/// Cache that drops entries not accessed for a fixed window.
///
/// Reads and `size` take shared access; `add`, `invalidate_entry` and `clear`
/// take exclusive access. A sweeper running every window removes entries
/// idle for at least the window, so expiry is eventual: an entry can outlive
/// its window by up to one sweep period.
///
/// The sweeper stops when the cache is dropped.
#[derive(Debug)]
pub struct AutoExpiryCache<K, V> {
    store: Arc<ExpiryStore<K, V>>,
    sweeper: SweeperHandle,
}

impl<K: CacheKey, V: CacheValue> AutoExpiryCache<K, V> {
    // == Constructors ==
    /// Creates an empty cache whose sweeper runs on a dedicated thread.
    ///
    /// Fails with `InvalidArgument` for a zero window and with
    /// `Configuration` if the sweeper thread cannot be started.
    pub fn new(expiry_window: Duration) -> Result<Self> {
        check_window(expiry_window)?;
        let store = Arc::new(ExpiryStore::new(expiry_window));
        let sweeper = SweeperHandle::spawn_dedicated(Arc::downgrade(&store), expiry_window)?;
        Ok(Self::started(store, sweeper))
    }

    /// Creates an empty cache whose sweeper is a task on `runtime`.
    ///
    /// The sweeper ends if `runtime` shuts down before the cache is dropped;
    /// [`AutoExpiryCache::is_sweeper_running`] reports that.
    pub fn with_runtime(expiry_window: Duration, runtime: &Handle) -> Result<Self> {
        check_window(expiry_window)?;
        let store = Arc::new(ExpiryStore::new(expiry_window));
        let sweeper = SweeperHandle::spawn(runtime, Arc::downgrade(&store), expiry_window);
        Ok(Self::started(store, sweeper))
    }

    fn started(store: Arc<ExpiryStore<K, V>>, sweeper: SweeperHandle) -> Self {
        info!(
            expiry_window_ms = u64::try_from(store.window.as_millis()).unwrap_or(u64::MAX),
            "Auto-expiry cache created"
        );
        Self { store, sweeper }
    }

    pub fn expiry_window(&self) -> Duration {
        self.store.window
    }

    /// False once the sweeper has exited. Entries stop expiring from then on.
    pub fn is_sweeper_running(&self) -> bool {
        !self.sweeper.is_finished()
    }

    /// Stops the sweeper and waits for it to exit.
    pub async fn shutdown(self) {
        self.sweeper.stop().await;
    }
}

fn check_window(expiry_window: Duration) -> Result<()> {
    if expiry_window.is_zero() {
        return Err(CacheError::InvalidArgument(
            "Expiry window must be positive".to_string(),
        ));
    }
    Ok(())
}

impl<K: CacheKey, V: CacheValue> Cache<K, V> for AutoExpiryCache<K, V> {
    fn add(&self, key: K, value: V) -> Result<Option<V>> {
        check_key(&key)?;
        check_value(&value)?;
        Ok(self.store.add(key, value))
    }

    fn retrieve(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        Ok(self.store.retrieve(key))
    }

    fn invalidate_entry(&self, key: &K) -> Result<Option<V>> {
        check_key(key)?;
        Ok(self.store.invalidate(key))
    }

    fn clear(&self) {
        self.store.clear();
    }

    fn size(&self) -> usize {
        self.store.len()
    }

    /// Copies entries under shared access, in no particular order.
    fn list_entries(&self) -> Vec<(K, V)> {
        self.store.list()
    }

    fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}
