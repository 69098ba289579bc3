//! Cache Factory
//!
//! Builds a cache variant from explicit parameters or from a [`CacheConfig`].

use std::time::Duration;

use tracing::info;

use crate::cache::{
    AutoExpiryCache, Cache, CacheKey, CacheValue, ConcurrentCache, LruCache, UnboundedCache,
};
use crate::config::{CacheConfig, CacheKind};
use crate::error::Result;

/// Boxed cache handed out by the factory.
pub type BoxedCache<K, V> = Box<dyn Cache<K, V>>;

// == Cache Factory ==
/// Constructs caches behind the common [`Cache`] trait.
pub struct CacheFactory;

impl CacheFactory {
    /// Bounded LRU cache. Once full, each new key evicts the least recently
    /// used entry.
    pub fn create_fixed_capacity_lru<K: CacheKey, V: CacheValue>(
        max_capacity: usize,
    ) -> Result<BoxedCache<K, V>> {
        Ok(Box::new(LruCache::new(max_capacity)?))
    }

    /// Cache whose entries are dropped once idle for `expiry_window`. Its
    /// sweeper runs on a dedicated thread.
    pub fn create_auto_expiry<K: CacheKey, V: CacheValue>(
        expiry_window: Duration,
    ) -> Result<BoxedCache<K, V>> {
        Ok(Box::new(AutoExpiryCache::new(expiry_window)?))
    }

    /// Unbounded cache using a reader/writer lock.
    pub fn create_unbounded<K: CacheKey, V: CacheValue>(
        initial_capacity: usize,
    ) -> Result<BoxedCache<K, V>> {
        Ok(Box::new(UnboundedCache::new(initial_capacity)))
    }

    /// Unbounded cache backed by a concurrent map.
    pub fn create_concurrent<K: CacheKey, V: CacheValue>(
        initial_capacity: usize,
    ) -> Result<BoxedCache<K, V>> {
        Ok(Box::new(ConcurrentCache::new(initial_capacity)))
    }

    /// Validates `config` and builds the variant it selects.
    pub fn build<K: CacheKey, V: CacheValue>(config: &CacheConfig) -> Result<BoxedCache<K, V>> {
        config.validate()?;
        info!(kind = %config.kind, "Building cache");

        match config.kind {
            CacheKind::FixedCapacityLru => Self::create_fixed_capacity_lru(config.max_capacity),
            CacheKind::AutoExpiry => Self::create_auto_expiry(config.expiry_window()),
            CacheKind::Unbounded => Self::create_unbounded(config.initial_capacity),
            CacheKind::Concurrent => Self::create_concurrent(config.initial_capacity),
        }
    }
}
