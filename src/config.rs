//! Configuration Module
//!
//! Handles loading and validating cache construction parameters.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Cache Kind ==
/// Selects which policy/strategy pair the factory builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheKind {
    /// Bounded LRU behind a single exclusive lock
    #[serde(rename = "lru")]
    FixedCapacityLru,
    /// Idle-expiry cache with a background sweeper
    #[serde(rename = "auto-expiry")]
    AutoExpiry,
    /// Unbounded map behind a reader/writer lock
    #[serde(rename = "unbounded")]
    Unbounded,
    /// Unbounded lock-free concurrent map
    #[serde(rename = "concurrent")]
    Concurrent,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::FixedCapacityLru => "lru",
            CacheKind::AutoExpiry => "auto-expiry",
            CacheKind::Unbounded => "unbounded",
            CacheKind::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(CacheKind::FixedCapacityLru),
            "auto-expiry" => Ok(CacheKind::AutoExpiry),
            "unbounded" => Ok(CacheKind::Unbounded),
            "concurrent" => Ok(CacheKind::Concurrent),
            other => Err(CacheError::Configuration(format!(
                "Unknown cache kind: {}",
                other
            ))),
        }
    }
}

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which cache variant to build
    pub kind: CacheKind,
    /// Maximum number of entries (bounded LRU only)
    pub max_capacity: usize,
    /// Idle time in milliseconds after which entries expire (auto-expiry only)
    pub expiry_window_ms: u64,
    /// Pre-allocation hint for the unbounded variants
    pub initial_capacity: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_KIND` - `lru`, `auto-expiry`, `unbounded` or `concurrent` (default: lru)
    /// - `CACHE_MAX_CAPACITY` - Maximum entries for the LRU cache (default: 1000)
    /// - `CACHE_EXPIRY_WINDOW_MS` - Idle expiry window in milliseconds (default: 5000)
    /// - `CACHE_INITIAL_CAPACITY` - Initial size hint (default: 16)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            kind: env::var("CACHE_KIND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.kind),
            max_capacity: env::var("CACHE_MAX_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_capacity),
            expiry_window_ms: env::var("CACHE_EXPIRY_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expiry_window_ms),
            initial_capacity: env::var("CACHE_INITIAL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.initial_capacity),
        }
    }

    /// Parses a configuration from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::Configuration(format!("Invalid cache config: {}", e)))
    }

    /// Returns the expiry window as a Duration.
    pub fn expiry_window(&self) -> Duration {
        Duration::from_millis(self.expiry_window_ms)
    }

    /// Checks the parameters relevant to the selected kind.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            CacheKind::FixedCapacityLru if self.max_capacity == 0 => Err(
                CacheError::Configuration("max_capacity must be positive".to_string()),
            ),
            CacheKind::AutoExpiry if self.expiry_window_ms == 0 => Err(
                CacheError::Configuration("expiry_window_ms must be positive".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kind: CacheKind::FixedCapacityLru,
            max_capacity: 1000,
            expiry_window_ms: 5000,
            initial_capacity: 16,
        }
    }
}
