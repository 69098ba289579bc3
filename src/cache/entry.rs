//! Cache Entry Module
//!
//! Defines entries carrying a last-access timestamp for idle expiry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

// == Clock ==
/// Monotonic nanosecond clock anchored at the owning cache's creation.
///
/// Uses tokio's `Instant`, so paused test runtimes control it.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Nanoseconds elapsed since the clock was created. Saturates after
    /// roughly 584 years.
    pub fn now_nanos(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

// == Expiring Entry ==
/// A stored value plus the time it was last added or retrieved.
///
/// `last_accessed` is refreshed by readers holding only shared access. Two
/// concurrent refreshes may land in either order; the sweeper tolerates a
/// timestamp that is slightly stale.
#[derive(Debug)]
pub struct ExpiringEntry<V> {
    /// The stored value
    pub value: V,
    /// Last access, in nanoseconds on the owning cache's clock
    last_accessed: AtomicU64,
}

impl<V> ExpiringEntry<V> {
    // == Constructor ==
    pub fn new(value: V, now_nanos: u64) -> Self {
        Self {
            value,
            last_accessed: AtomicU64::new(now_nanos),
        }
    }

    // == Touch ==
    /// Marks the entry as just used.
    pub fn touch(&self, now_nanos: u64) {
        self.last_accessed.store(now_nanos, Ordering::Relaxed);
    }

    pub fn last_accessed_nanos(&self) -> u64 {
        self.last_accessed.load(Ordering::Relaxed)
    }

    /// Time since the last access. Zero if `now_nanos` lags the stamp.
    pub fn idle(&self, now_nanos: u64) -> Duration {
        Duration::from_nanos(now_nanos.saturating_sub(self.last_accessed_nanos()))
    }

    // == Is Expired ==
    /// Boundary condition: an entry idle for exactly the window is expired.
    pub fn is_expired(&self, now_nanos: u64, window: Duration) -> bool {
        self.idle(now_nanos) >= window
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = ExpiringEntry::new("test_value".to_string(), 42);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.last_accessed_nanos(), 42);
    }

    #[test]
    fn test_touch_refreshes_timestamp() {
        let entry = ExpiringEntry::new(1u32, 10 * MS);
        entry.touch(75 * MS);

        assert_eq!(entry.last_accessed_nanos(), 75 * MS);
        assert_eq!(entry.idle(100 * MS), Duration::from_millis(25));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = ExpiringEntry::new("test", 1_000 * MS);
        let window = Duration::from_millis(500);

        assert!(!entry.is_expired(1_500 * MS - 1, window));
        assert!(entry.is_expired(1_500 * MS, window), "Entry should be expired at boundary");
        assert!(entry.is_expired(9_000 * MS, window));
    }

    #[test]
    fn test_sub_millisecond_window_not_rounded() {
        let entry = ExpiringEntry::new("test", 0);
        let window = Duration::from_micros(500);

        assert!(!entry.is_expired(0, window), "Fresh entry must not be expired");
        assert!(!entry.is_expired(499_999, window));
        assert!(entry.is_expired(500_000, window));
    }

    #[test]
    fn test_fractional_millisecond_window_not_truncated() {
        let entry = ExpiringEntry::new("test", 900_000);
        let window = Duration::from_micros(1_500);

        // 600us idle against a 1.5ms window
        assert!(!entry.is_expired(1_500_000, window));
        assert!(!entry.is_expired(2_399_999, window));
        assert!(entry.is_expired(2_400_000, window));
    }

    #[test]
    fn test_idle_saturates_when_clock_lags() {
        let entry = ExpiringEntry::new("test", 500 * MS);
        assert_eq!(entry.idle(100 * MS), Duration::ZERO);
        assert!(!entry.is_expired(100 * MS, Duration::from_millis(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_paused_time() {
        let clock = Clock::new();
        assert_eq!(clock.now_nanos(), 0);

        tokio::time::advance(Duration::from_micros(1_250_500)).await;
        assert_eq!(clock.now_nanos(), 1_250_500_000);
    }
}
