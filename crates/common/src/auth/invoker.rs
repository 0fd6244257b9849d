//! Authorized invocation with a single forced-refresh retry
//!
//! Wraps an operation that needs a bearer token. The operation reports an
//! authorization rejection as [`OperationError::Unauthorized`]; the invoker
//! then forces one refresh and retries exactly once. A second rejection is
//! reported as [`InvokeError::AuthorizationExhausted`] without another
//! refresh.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::errors::CredentialError;
use super::traits::AccessTokenSource;
use crate::error::{ErrorClassification, ErrorSeverity};

/// Outcome reported by an authorized operation
#[derive(Debug, Error)]
pub enum OperationError<E> {
    /// The remote side rejected the bearer token (HTTP 401 or equivalent)
    #[error("access token rejected")]
    Unauthorized,

    /// Any other failure; passed through unchanged
    #[error(transparent)]
    Other(E),
}

/// Errors returned by [`ResilientInvoker::invoke`]
#[derive(Debug, Error)]
pub enum InvokeError<E> {
    /// Obtaining or refreshing the token failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The token was rejected again right after a forced refresh
    #[error("authorization rejected after refreshing the access token")]
    AuthorizationExhausted,

    /// The operation failed for a reason other than authorization
    #[error(transparent)]
    Operation(E),
}

impl<E: ErrorClassification> ErrorClassification for InvokeError<E> {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Credential(err) => err.is_retryable(),
            Self::AuthorizationExhausted => false,
            Self::Operation(err) => err.is_retryable(),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Credential(err) => err.severity(),
            Self::AuthorizationExhausted => ErrorSeverity::Error,
            Self::Operation(err) => err.severity(),
        }
    }

    fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::Operation(err) => err.retry_after(),
            _ => None,
        }
    }
}

/// Runs operations with a valid token, retrying once on rejection
#[derive(Clone)]
pub struct ResilientInvoker {
    tokens: Arc<dyn AccessTokenSource>,
}

impl std::fmt::Debug for ResilientInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientInvoker").finish_non_exhaustive()
    }
}

impl ResilientInvoker {
    /// Create an invoker drawing tokens from `tokens`
    #[must_use]
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self { tokens }
    }

    /// Run `operation` with a valid access token
    ///
    /// `operation` is called at most twice: once with the current token and,
    /// if that is rejected, once more with a freshly forced token.
    ///
    /// # Errors
    /// - `Credential` if a token cannot be obtained (the operation is not
    ///   called, or not retried)
    /// - `AuthorizationExhausted` if the retried call is rejected as well
    /// - `Operation` for any other failure of the operation
    pub async fn invoke<T, E, F, Fut>(&self, mut operation: F) -> Result<T, InvokeError<E>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, OperationError<E>>>,
    {
        let token = self.tokens.ensure_valid().await?;

        match operation(token).await {
            Ok(value) => return Ok(value),
            Err(OperationError::Other(err)) => return Err(InvokeError::Operation(err)),
            Err(OperationError::Unauthorized) => {
                debug!("Access token rejected; forcing refresh and retrying once");
            }
        }

        let token = self.tokens.force_refresh().await?;

        match operation(token).await {
            Ok(value) => Ok(value),
            Err(OperationError::Other(err)) => Err(InvokeError::Operation(err)),
            Err(OperationError::Unauthorized) => {
                warn!("Access token rejected again after refresh");
                Err(InvokeError::AuthorizationExhausted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::invoker.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::auth::errors::{RefreshFailure, RefreshFailureKind};

    /// Token source handing out `T0`, then `T1`, `T2`... on each forced
    /// refresh.
    #[derive(Default)]
    struct CountingSource {
        ensure_calls: AtomicUsize,
        force_calls: AtomicUsize,
        fail_force: bool,
        fail_ensure: bool,
    }

    #[async_trait]
    impl AccessTokenSource for CountingSource {
        async fn ensure_valid(&self) -> Result<String, CredentialError> {
            self.ensure_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_ensure {
                return Err(CredentialError::MissingRefreshToken);
            }
            Ok(format!("T{}", self.force_calls.load(Ordering::SeqCst)))
        }

        async fn force_refresh(&self) -> Result<String, CredentialError> {
            if self.fail_force {
                return Err(CredentialError::RefreshFailed(RefreshFailure::new(
                    RefreshFailureKind::Rejected,
                    Some(400),
                    "invalid_grant",
                )));
            }
            let n = self.force_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("T{n}"))
        }
    }

    fn invoker(source: &Arc<CountingSource>) -> ResilientInvoker {
        ResilientInvoker::new(Arc::clone(source) as Arc<dyn AccessTokenSource>)
    }

    /// Validates that a successful operation runs once with the current
    /// token.
    #[tokio::test]
    async fn test_success_runs_once() {
        let source = Arc::new(CountingSource::default());
        let seen = Mutex::new(Vec::new());

        let result: Result<u32, InvokeError<String>> = invoker(&source)
            .invoke(|token| {
                seen.lock().unwrap().push(token);
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(*seen.lock().unwrap(), vec!["T0".to_string()]);
        assert_eq!(source.force_calls.load(Ordering::SeqCst), 0);
    }

    /// Validates the rejected-then-accepted scenario.
    ///
    /// Assertions:
    /// - The operation is called twice, the second time with the new token.
    /// - Exactly one forced refresh happens.
    #[tokio::test]
    async fn test_unauthorized_then_success_retries_with_new_token() {
        let source = Arc::new(CountingSource::default());
        let seen = Mutex::new(Vec::new());

        let result: Result<&str, InvokeError<String>> = invoker(&source)
            .invoke(|token| {
                let first = seen.lock().unwrap().is_empty();
                seen.lock().unwrap().push(token);
                async move {
                    if first {
                        Err(OperationError::Unauthorized)
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(*seen.lock().unwrap(), vec!["T0".to_string(), "T1".to_string()]);
        assert_eq!(source.force_calls.load(Ordering::SeqCst), 1);
    }

    /// Validates that a second rejection ends with `AuthorizationExhausted`.
    #[tokio::test]
    async fn test_unauthorized_twice_is_exhausted() {
        let source = Arc::new(CountingSource::default());
        let calls = AtomicUsize::new(0);

        let result: Result<(), InvokeError<String>> = invoker(&source)
            .invoke(|_token| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::Unauthorized) }
            })
            .await;

        assert!(matches!(result, Err(InvokeError::AuthorizationExhausted)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.force_calls.load(Ordering::SeqCst), 1);
    }

    /// Validates that non-authorization failures pass through unchanged
    /// without a refresh.
    #[tokio::test]
    async fn test_other_failure_passes_through() {
        let source = Arc::new(CountingSource::default());

        let result: Result<(), InvokeError<String>> = invoker(&source)
            .invoke(|_token| async { Err(OperationError::Other("HTTP 500".to_string())) })
            .await;

        match result {
            Err(InvokeError::Operation(message)) => assert_eq!(message, "HTTP 500"),
            other => panic!("expected Operation error, got {other:?}"),
        }
        assert_eq!(source.force_calls.load(Ordering::SeqCst), 0);
    }

    /// Validates that a credential failure prevents the operation call.
    #[tokio::test]
    async fn test_credential_failure_skips_operation() {
        let source = Arc::new(CountingSource { fail_ensure: true, ..Default::default() });
        let calls = AtomicUsize::new(0);

        let result: Result<(), InvokeError<String>> = invoker(&source)
            .invoke(|_token| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(InvokeError::Credential(CredentialError::MissingRefreshToken))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Validates that a failed forced refresh is surfaced without a retry.
    #[tokio::test]
    async fn test_forced_refresh_failure_is_surfaced() {
        let source = Arc::new(CountingSource { fail_force: true, ..Default::default() });
        let calls = AtomicUsize::new(0);

        let result: Result<(), InvokeError<String>> = invoker(&source)
            .invoke(|_token| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::Unauthorized) }
            })
            .await;

        match result {
            Err(InvokeError::Credential(CredentialError::RefreshFailed(failure))) => {
                assert!(failure.is_rejection());
            }
            other => panic!("expected Credential error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
