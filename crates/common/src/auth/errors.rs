//! Credential lifecycle error types
//!
//! Provides the closed error taxonomy for the credential store and token
//! manager, with retry metadata via [`ErrorClassification`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::client::OAuthClientError;
use crate::error::{ErrorClassification, ErrorSeverity};

/// Categories of refresh failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshFailureKind {
    /// Connection, TLS or body read failure
    Transport,
    /// The refresh did not complete within the configured timeout
    Timeout,
    /// The authorization server refused the grant (4xx other than 408/429)
    Rejected,
    /// Non-success status that may clear up on its own (408, 429, 5xx)
    Upstream,
    /// Success status with an unusable body
    Malformed,
}

impl fmt::Display for RefreshFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport failure",
            Self::Timeout => "timed out",
            Self::Rejected => "rejected by authorization server",
            Self::Upstream => "authorization server unavailable",
            Self::Malformed => "malformed token response",
        };
        f.write_str(label)
    }
}

/// Outcome record of a failed refresh attempt
///
/// Cloneable so every caller waiting on the same in-flight refresh receives
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// What went wrong
    pub kind: RefreshFailureKind,
    /// Upstream HTTP status, if a response was received
    pub status: Option<u16>,
    /// Human-readable cause (never contains token material)
    pub message: String,
}

impl RefreshFailure {
    /// Create a refresh failure
    #[must_use]
    pub fn new(kind: RefreshFailureKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self { kind, status, message: message.into() }
    }

    /// Failure for a refresh that outlived its timeout
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(RefreshFailureKind::Timeout, None, format!("no response after {after:?}"))
    }

    /// Whether the authorization server refused the grant itself
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.kind == RefreshFailureKind::Rejected
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", self.kind, status, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl From<OAuthClientError> for RefreshFailure {
    fn from(err: OAuthClientError) -> Self {
        match err {
            OAuthClientError::RequestFailed(e) if e.is_timeout() => {
                Self::new(RefreshFailureKind::Timeout, None, e.to_string())
            }
            OAuthClientError::RequestFailed(e) => {
                Self::new(RefreshFailureKind::Transport, None, e.to_string())
            }
            OAuthClientError::OAuthError { status, error } => {
                let kind = if (400..500).contains(&status) && status != 408 && status != 429 {
                    RefreshFailureKind::Rejected
                } else {
                    RefreshFailureKind::Upstream
                };
                Self::new(kind, Some(status), error.to_string())
            }
            OAuthClientError::ParseError(message) => {
                Self::new(RefreshFailureKind::Malformed, None, message)
            }
            OAuthClientError::NoRefreshToken => {
                Self::new(RefreshFailureKind::Rejected, None, "no refresh token supplied")
            }
        }
    }
}

/// Persistence failures reported by a credential store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read credential file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {} is not a JSON object: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write credential file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store task failed: {0}")]
    Task(String),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the credential store and token manager
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Required static credentials missing or unreadable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Refresh request failed, or the manager is in the terminal state
    #[error("Token refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    /// No refresh token on record; re-authorization required
    #[error("No refresh token on record; re-authorization required")]
    MissingRefreshToken,

    /// Persisting the credential failed
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl ErrorClassification for CredentialError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RefreshFailed(failure) => matches!(
                failure.kind,
                RefreshFailureKind::Transport
                    | RefreshFailureKind::Timeout
                    | RefreshFailureKind::Upstream
            ),
            Self::Configuration(_) | Self::MissingRefreshToken | Self::Store(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(_) | Self::MissingRefreshToken => ErrorSeverity::Critical,
            Self::RefreshFailed(failure) if failure.is_rejection() => ErrorSeverity::Critical,
            Self::RefreshFailed(failure) if failure.kind == RefreshFailureKind::Malformed => {
                ErrorSeverity::Error
            }
            Self::RefreshFailed(_) => ErrorSeverity::Warning,
            Self::Store(_) => ErrorSeverity::Error,
        }
    }
}
