//! Mock implementations of the auth traits
//!
//! Provides in-memory doubles for the token endpoint and the credential
//! store so lifecycle tests run without network or disk.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{
    ClientCredentials, CredentialError, CredentialRecord, CredentialStoreTrait, OAuthClientError,
    OAuthClientTrait, OAuthError, StoreError, TokenResponse,
};

#[derive(Debug, Clone)]
struct ScriptedResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

impl ScriptedResponse {
    fn to_response(&self) -> TokenResponse {
        TokenResponse {
            access_token: self.access_token.clone(),
            expires_in: self.expires_in,
            refresh_token: self.refresh_token.clone(),
            token_type: Some("Bearer".to_string()),
            scope: None,
        }
    }
}

/// Mock OAuth client that simulates the token endpoint without network calls.
///
/// Clones share state, so a test keeps one handle while the token manager
/// owns another.
#[derive(Clone, Debug)]
pub struct MockOAuthClient {
    refresh_count: Arc<AtomicUsize>,
    response: Arc<Mutex<ScriptedResponse>>,
    failure_status: Arc<Mutex<Option<u16>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
}

impl MockOAuthClient {
    /// Create a mock that issues `refreshed_access_token` for one hour.
    pub fn new() -> Self {
        Self {
            refresh_count: Arc::new(AtomicUsize::new(0)),
            response: Arc::new(Mutex::new(ScriptedResponse {
                access_token: "refreshed_access_token".to_string(),
                expires_in: Some(3600),
                refresh_token: None,
            })),
            failure_status: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
            last_refresh_token: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure the token endpoint response.
    pub fn set_refresh_response(
        &self,
        access_token: &str,
        expires_in: Option<i64>,
        refresh_token: Option<&str>,
    ) {
        *self.response.lock() = ScriptedResponse {
            access_token: access_token.to_string(),
            expires_in,
            refresh_token: refresh_token.map(str::to_string),
        };
    }

    /// Make every refresh fail with the given HTTP status.
    pub fn set_failure(&self, status: u16) {
        *self.failure_status.lock() = Some(status);
    }

    /// Stop failing refreshes.
    pub fn clear_failure(&self) {
        *self.failure_status.lock() = None;
    }

    /// Delay each refresh before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Number of refresh requests received.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }

    /// Refresh token sent with the most recent request.
    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().clone()
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    async fn refresh_access_token(
        &self,
        _client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock() = Some(refresh_token.to_string());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = *self.failure_status.lock();
        if let Some(status) = failure {
            let error = if (400..500).contains(&status) {
                OAuthError {
                    error: "invalid_grant".to_string(),
                    error_description: Some("Refresh token revoked".to_string()),
                }
            } else {
                OAuthError::from_status(status, "service unavailable")
            };
            return Err(OAuthClientError::OAuthError { status, error });
        }

        let response = self.response.lock().to_response();
        Ok(response)
    }
}

/// In-memory credential store
#[derive(Clone, Debug, Default)]
pub struct MockCredentialStore {
    record: Arc<Mutex<Option<CredentialRecord>>>,
    save_count: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MockCredentialStore {
    /// Create an empty store; `load` fails until a record is saved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `record`.
    pub fn with_record(record: CredentialRecord) -> Self {
        let store = Self::default();
        *store.record.lock() = Some(record);
        store
    }

    /// Make every `save` fail.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// The record currently held.
    #[must_use]
    pub fn record(&self) -> Option<CredentialRecord> {
        self.record.lock().clone()
    }
}

#[async_trait]
impl CredentialStoreTrait for MockCredentialStore {
    async fn load(&self) -> Result<CredentialRecord, CredentialError> {
        self.record().ok_or_else(|| {
            CredentialError::Configuration("no credential record in mock store".to_string())
        })
    }

    async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock store configured to fail".to_string()));
        }
        *self.record.lock() = Some(record.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::mocks.
    use super::*;

    /// Validates the default mock refresh response.
    ///
    /// Assertions:
    /// - Confirms `response.access_token` equals `"refreshed_access_token"`.
    /// - Confirms `client.refresh_count()` equals `1`.
    #[tokio::test]
    async fn test_mock_oauth_client_refresh() {
        let client = MockOAuthClient::new();
        let creds = ClientCredentials::new("id", "secret");

        let response =
            client.refresh_access_token(&creds, "RT1").await.expect("refresh should succeed");

        assert_eq!(response.access_token, "refreshed_access_token");
        assert_eq!(client.refresh_count(), 1);
        assert_eq!(client.last_refresh_token().as_deref(), Some("RT1"));
    }

    /// Validates the mock oauth client failure scenario.
    #[tokio::test]
    async fn test_mock_oauth_client_failure() {
        let client = MockOAuthClient::new();
        client.set_failure(400);

        let result = client.refresh_access_token(&ClientCredentials::new("id", "s"), "RT1").await;
        assert!(matches!(result, Err(OAuthClientError::OAuthError { status: 400, .. })));
    }

    /// Validates the mock store save and failure scenarios.
    #[tokio::test]
    async fn test_mock_store_save() {
        let store = MockCredentialStore::new();
        assert!(store.load().await.is_err());

        let record = CredentialRecord {
            client: ClientCredentials::new("id", "secret"),
            credential: crate::auth::Credential::new("AT", "RT", 1),
        };
        store.save(&record).await.expect("save");
        assert_eq!(store.load().await.expect("load"), record);
        assert_eq!(store.save_count(), 1);

        store.set_fail_saves(true);
        assert!(store.save(&record).await.is_err());
        assert_eq!(store.save_count(), 1);
    }
}
