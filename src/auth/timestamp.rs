//! Request timestamps for BingX API authentication.
//!
//! Every request carries a `timestamp` parameter in milliseconds since the
//! UNIX epoch. BingX rejects requests whose timestamp drifts too far from
//! server time (error 100421).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing request timestamps.
pub trait TimestampProvider: Send + Sync {
    /// Milliseconds since the UNIX epoch for the next request.
    fn timestamp_millis(&self) -> u64;
}

/// Wall-clock timestamps that never move backwards.
///
/// If the system clock is stepped back, the last issued value is reused
/// until the clock catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    /// Create a new system clock provider.
    pub fn new() -> Self {
        Self::default()
    }

    fn current_time_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

impl TimestampProvider for SystemClock {
    fn timestamp_millis(&self) -> u64 {
        let now = Self::current_time_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

/// A provider that always returns the same timestamp.
///
/// Useful for reproducing signatures in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestamp(pub u64);

impl TimestampProvider for FixedTimestamp {
    fn timestamp_millis(&self) -> u64 {
        self.0
    }
}
