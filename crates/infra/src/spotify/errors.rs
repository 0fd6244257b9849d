//! Catalog-specific error types
//!
//! Provides error classification for Web API calls with retry metadata.

use std::time::Duration;

use thiserror::Error;
use tunequiz_common::error::{ErrorClassification, ErrorSeverity};

/// Web API failures other than a rejected access token
///
/// A 401 never becomes a `CatalogError`: it is reported to the invoker as
/// `OperationError::Unauthorized` so the token can be refreshed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited by Spotify")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Playlist not found: {0}")]
    NotFound(String),

    #[error("Invalid playlist ID: {0:?}")]
    InvalidPlaylistId(String),

    #[error("Spotify returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse Spotify response: {0}")]
    Parse(String),
}

impl ErrorClassification for CatalogError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::InvalidPlaylistId(_) | Self::Parse(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) | Self::InvalidPlaylistId(_) => ErrorSeverity::Info,
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited { .. } => ErrorSeverity::Warning,
            Self::Status { status, .. } if *status >= 500 => ErrorSeverity::Warning,
            Self::Status { .. } | Self::Parse(_) => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry() {
        assert!(CatalogError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(CatalogError::RateLimited { retry_after: None }.is_retryable());
        assert!(CatalogError::Status { status: 503, message: String::new() }.is_retryable());
        assert!(!CatalogError::Status { status: 403, message: String::new() }.is_retryable());
        assert!(!CatalogError::NotFound("p".into()).is_retryable());
        assert!(!CatalogError::Parse("eof".into()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = CatalogError::RateLimited { retry_after: Some(Duration::from_secs(7)) };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(CatalogError::Parse("x".into()).retry_after(), None);
    }
}
