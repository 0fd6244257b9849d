//! Error classification shared by every Tunequiz error type
//!
//! Each layer keeps its own `thiserror` enum (credential errors, invoker
//! errors, catalog errors). They all implement [`ErrorClassification`] so the
//! CLI can pick the log level for a failed command and report whether trying
//! again later makes sense, without matching on foreign variants.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | No round running, empty playlist |
//! | **Warning** | Degraded but operational | Rate limiting, refresh timeout |
//! | **Error** | Failure requiring attention | Refresh rejected, store write failed |
//! | **Critical** | Operator action required | Missing client credentials, missing refresh token |

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors
///
/// ```rust,ignore
/// impl ErrorClassification for CatalogError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, Self::Network(_) | Self::Timeout(_))
///     }
///     fn severity(&self) -> ErrorSeverity {
///         ErrorSeverity::Warning
///     }
/// }
/// ```
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again later (network timeouts, rate limiting, upstream 5xx).
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring operator action
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Transient;

    impl ErrorClassification for Transient {
        fn is_retryable(&self) -> bool {
            true
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Warning
        }
    }

    struct Fatal;

    impl ErrorClassification for Fatal {
        fn is_retryable(&self) -> bool {
            false
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Critical
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "INFO");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_default_is_critical_follows_severity() {
        assert!(!Transient.is_critical());
        assert!(Fatal.is_critical());
        assert_eq!(Transient.retry_after(), None);
    }
}
