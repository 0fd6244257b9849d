//! Clock abstraction
//!
//! Credential expiry is bookkept in whole epoch seconds, so the lifecycle
//! manager reads wall-clock time through [`Clock`] rather than calling
//! `SystemTime::now()` directly. Production code uses [`SystemClock`]; tests
//! drive expiry with `testing::MockClock`.
//!
//! ```rust
//! use tunequiz_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! assert!(clock.unix_seconds() > 0);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable testing
pub trait Clock: Send + Sync {
    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Get whole seconds since UNIX epoch
    ///
    /// Clocks set before the epoch report `0`.
    fn unix_seconds(&self) -> i64 {
        self.system_time()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or_default()
    }
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}
