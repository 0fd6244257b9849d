//! Mock clock for deterministic expiry tests
//!
//! ```
//! use std::time::Duration;
//!
//! use tunequiz_common::testing::MockClock;
//! use tunequiz_common::time::Clock;
//!
//! let clock = MockClock::at_unix(1_700_000_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.unix_seconds(), 1_700_000_005);
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::time::Clock;

/// Mock clock whose time only moves when told to
///
/// Clones share the same elapsed counter, so a test can keep one handle
/// while the lifecycle manager owns another.
#[derive(Debug, Clone)]
pub struct MockClock {
    elapsed: Arc<Mutex<Duration>>,
    base_system_time: SystemTime,
}

impl MockClock {
    /// Create a mock clock starting at the current real time
    #[must_use]
    pub fn new() -> Self {
        Self {
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            base_system_time: SystemTime::now(),
        }
    }

    /// Create a mock clock whose wall time starts at `secs` since the epoch
    #[must_use]
    pub fn at_unix(secs: u64) -> Self {
        Self {
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            base_system_time: UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Get the simulated time since the clock was created
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn system_time(&self) -> SystemTime {
        self.base_system_time + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::time.
    use super::*;

    /// Validates the mock clock advance scenario.
    ///
    /// Assertions:
    /// - Confirms `clock.elapsed()` equals `5s`.
    /// - Confirms `clock.unix_seconds()` moved by 5.
    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::at_unix(1_000);

        clock.advance(Duration::from_secs(5));

        assert_eq!(clock.elapsed(), Duration::from_secs(5));
        assert_eq!(clock.unix_seconds(), 1_005);
    }

    /// Validates that clones share elapsed time.
    ///
    /// Assertions:
    /// - Confirms `other.elapsed()` equals the advance applied to `clock`.
    #[test]
    fn test_mock_clock_clones_share_state() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(42));

        assert_eq!(other.elapsed(), Duration::from_secs(42));
    }
}
