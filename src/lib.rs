//! Cache Provider - A family of in-memory key-value caches
//!
//! Provides bounded LRU eviction, idle-time expiry with background sweeping,
//! and unbounded caches behind reader/writer or lock-free concurrency.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod tasks;

pub use cache::{
    AutoExpiryCache, Cache, CacheStats, ConcurrentCache, LruCache, UnboundedCache,
};
pub use config::{CacheConfig, CacheKind};
pub use error::{CacheError, Result};
pub use factory::{BoxedCache, CacheFactory};
