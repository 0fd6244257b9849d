//! Token manager with on-demand refresh
//!
//! Manages the OAuth credential lifecycle:
//! - Serves the cached access token while it is outside the refresh skew
//! - Refreshes lazily when a caller finds the token stale (no background task)
//! - Coalesces concurrent refreshes into a single upstream request
//! - Persists every refreshed credential through the credential store
//! - Stops refreshing once the authorization server rejects the grant
//!
//! ## Validity states
//!
//! ```text
//!   Uninitialized ──refresh ok──▶ Valid ──skew reached──▶ Expiring
//!         │                        ▲                         │
//!         │                        └──────refresh ok─────────┤
//!         │                                                  ▼
//!         └──────────────────────────────────────────▶ Refreshing
//!                                                            │
//!                                           grant rejected   ▼
//!                                                      Unauthorized
//! ```
//!
//! `Unauthorized` is terminal: every call fails fast with
//! [`CredentialError::RefreshFailed`] until
//! [`TokenManager::install_refresh_token`] supplies a new refresh token.
//!
//! ## Locking
//!
//! The credential lives behind a synchronous `RwLock` that is never held
//! across an `.await`, so callers with a fresh token never wait on network
//! I/O. Refreshes are serialized by an async mutex. Each finished refresh
//! attempt bumps a generation counter; a caller that waited for the mutex and
//! finds the generation moved reuses that attempt's outcome instead of
//! issuing its own request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::client::OAuthClientError;
use super::errors::{CredentialError, RefreshFailure};
use super::traits::{AccessTokenSource, CredentialStoreTrait, OAuthClientTrait};
use super::types::{
    ClientCredentials, Credential, CredentialRecord, DEFAULT_REFRESH_SKEW_SECS,
    DEFAULT_TOKEN_LIFETIME_SECS,
};
use crate::time::{Clock, SystemClock};

/// Refresh policy knobs
#[derive(Debug, Clone)]
pub struct TokenManagerConfig {
    /// Treat the token as stale this many seconds before `expires_at`
    pub refresh_skew_seconds: i64,

    /// Upper bound on a single refresh exchange
    pub refresh_timeout: Duration,

    /// Lifetime assumed when the token endpoint omits `expires_in`
    pub default_lifetime_seconds: i64,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self {
            refresh_skew_seconds: DEFAULT_REFRESH_SKEW_SECS,
            refresh_timeout: Duration::from_secs(10),
            default_lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

/// Observed validity of the managed credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// No access token has been obtained yet
    Uninitialized,
    /// Access token usable without refreshing
    Valid,
    /// Access token inside the refresh skew or past expiry
    Expiring,
    /// A refresh exchange is in flight
    Refreshing,
    /// The authorization server rejected the refresh grant
    Unauthorized,
}

impl std::fmt::Display for CredentialState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Valid => "valid",
            Self::Expiring => "expiring",
            Self::Refreshing => "refreshing",
            Self::Unauthorized => "unauthorized",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of the manager, free of token material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    /// Current validity state
    pub state: CredentialState,
    /// Policy expiry in epoch seconds (0 if never refreshed)
    pub expires_at: i64,
    /// Seconds until policy expiry (negative once expired)
    pub seconds_until_expiry: i64,
    /// Whether a refresh token is on record
    pub has_refresh_token: bool,
    /// Whether the in-memory credential matches what was last persisted
    pub persisted: bool,
    /// Most recent refresh failure, cleared by the next success
    pub last_failure: Option<RefreshFailure>,
}

#[derive(Debug)]
struct State {
    credential: Credential,
    generation: u64,
    refreshing: bool,
    unauthorized: bool,
    persisted: bool,
    last_failure: Option<RefreshFailure>,
}

impl State {
    fn terminal_error(&self) -> CredentialError {
        let failure = self.last_failure.clone().unwrap_or_else(|| {
            RefreshFailure::new(
                super::errors::RefreshFailureKind::Rejected,
                None,
                "refresh grant previously rejected",
            )
        });
        CredentialError::RefreshFailed(failure)
    }
}

/// Clears the `refreshing` flag when the refresh future completes or is
/// dropped.
struct RefreshingGuard<'a> {
    state: &'a RwLock<State>,
}

impl<'a> RefreshingGuard<'a> {
    fn enter(state: &'a RwLock<State>) -> Self {
        state.write().refreshing = true;
        Self { state }
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.state.write().refreshing = false;
    }
}

/// Token manager with on-demand refresh
///
/// Sole owner and writer of the in-memory credential. Construct it once per
/// process (usually via [`TokenManager::load`]) and share it behind an `Arc`.
pub struct TokenManager<C: OAuthClientTrait + 'static, S: CredentialStoreTrait + 'static> {
    oauth_client: Arc<C>,
    store: Arc<S>,
    client: ClientCredentials,
    config: TokenManagerConfig,
    clock: Arc<dyn Clock>,
    state: RwLock<State>,
    refresh_lock: Mutex<()>,
}

impl<C: OAuthClientTrait + 'static, S: CredentialStoreTrait + 'static> TokenManager<C, S> {
    /// Create a token manager from an already loaded record
    ///
    /// # Arguments
    /// * `oauth_client` - Client for the refresh-token grant
    /// * `store` - Durable credential store
    /// * `record` - Client credentials and the persisted token pair
    /// * `config` - Refresh policy
    #[must_use]
    pub fn new(
        oauth_client: Arc<C>,
        store: Arc<S>,
        record: CredentialRecord,
        config: TokenManagerConfig,
    ) -> Self {
        Self {
            oauth_client,
            store,
            client: record.client,
            config,
            clock: Arc::new(SystemClock),
            state: RwLock::new(State {
                credential: record.credential,
                generation: 0,
                refreshing: false,
                unauthorized: false,
                persisted: true,
                last_failure: None,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Load the persisted record from `store` and build a manager around it
    ///
    /// # Errors
    /// Returns `CredentialError::Configuration` if the client ID or secret is
    /// missing
    pub async fn load(
        oauth_client: Arc<C>,
        store: Arc<S>,
        config: TokenManagerConfig,
    ) -> Result<Self, CredentialError> {
        let record = store.load().await?;
        info!(
            client_id = %record.client.client_id,
            has_refresh_token = record.credential.has_refresh_token(),
            "Token manager initialized from credential store"
        );
        Ok(Self::new(oauth_client, store, record, config))
    }

    /// Replace the clock (tests drive expiry with a mock clock)
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get an access token usable right now
    ///
    /// Returns the cached token if `now < expires_at - skew`; otherwise
    /// refreshes first. Callers arriving while a refresh is in flight receive
    /// that refresh's outcome.
    ///
    /// # Errors
    /// - `MissingRefreshToken` if a refresh is needed but no refresh token is
    ///   on record (no network call is made)
    /// - `RefreshFailed` if the refresh fails or the manager is in the
    ///   terminal state
    pub async fn ensure_valid(&self) -> Result<String, CredentialError> {
        let observed = {
            let state = self.state.read();
            if state.unauthorized {
                return Err(state.terminal_error());
            }
            if !state.refreshing
                && state.credential.is_usable(self.now(), self.config.refresh_skew_seconds)
            {
                return Ok(state.credential.access_token.clone());
            }
            state.generation
        };

        debug!("Access token stale or refresh in flight");
        self.refresh_coalesced(observed, false).await
    }

    /// Refresh unconditionally and return the new access token
    ///
    /// Used after a downstream call rejected a token the local clock still
    /// considered valid. A refresh already in flight satisfies the request.
    ///
    /// # Errors
    /// Same as [`TokenManager::ensure_valid`]
    pub async fn force_refresh(&self) -> Result<String, CredentialError> {
        let observed = {
            let state = self.state.read();
            if state.unauthorized {
                return Err(state.terminal_error());
            }
            state.generation
        };

        self.refresh_coalesced(observed, true).await
    }

    /// Install a refresh token obtained out of band
    ///
    /// Clears the access token and expiry so the next call refreshes, leaves
    /// the terminal state and persists the new record. Nothing changes in
    /// memory if persisting fails.
    ///
    /// # Errors
    /// - `Configuration` if `refresh_token` is empty
    /// - `Store` if the record cannot be persisted
    pub async fn install_refresh_token(&self, refresh_token: &str) -> Result<(), CredentialError> {
        if refresh_token.is_empty() {
            return Err(CredentialError::Configuration("refresh token must not be empty".into()));
        }

        let _permit = self.refresh_lock.lock().await;

        let credential = Credential::new("", refresh_token, 0);
        let record = CredentialRecord { client: self.client.clone(), credential: credential.clone() };
        self.store.save(&record).await?;

        {
            let mut state = self.state.write();
            state.credential = credential;
            state.generation += 1;
            state.unauthorized = false;
            state.persisted = true;
            state.last_failure = None;
        }

        info!("Refresh token installed; next call will refresh");
        Ok(())
    }

    /// Snapshot of the current validity, without token material
    #[must_use]
    pub fn status(&self) -> CredentialStatus {
        let now = self.now();
        let state = self.state.read();

        let validity = if state.unauthorized {
            CredentialState::Unauthorized
        } else if state.refreshing {
            CredentialState::Refreshing
        } else if !state.credential.has_access_token() {
            CredentialState::Uninitialized
        } else if state.credential.is_usable(now, self.config.refresh_skew_seconds) {
            CredentialState::Valid
        } else {
            CredentialState::Expiring
        };

        CredentialStatus {
            state: validity,
            expires_at: state.credential.expires_at,
            seconds_until_expiry: state.credential.seconds_until_expiry(now),
            has_refresh_token: state.credential.has_refresh_token(),
            persisted: state.persisted,
            last_failure: state.last_failure.clone(),
        }
    }

    /// Clone of the in-memory credential
    #[must_use]
    pub fn current(&self) -> Credential {
        self.state.read().credential.clone()
    }

    /// Client credentials this manager refreshes with
    #[must_use]
    pub fn client(&self) -> &ClientCredentials {
        &self.client
    }

    /// Refresh policy in effect
    #[must_use]
    pub fn config(&self) -> &TokenManagerConfig {
        &self.config
    }

    fn now(&self) -> i64 {
        self.clock.unix_seconds()
    }

    async fn refresh_coalesced(
        &self,
        observed_generation: u64,
        force: bool,
    ) -> Result<String, CredentialError> {
        let _permit = self.refresh_lock.lock().await;

        {
            let state = self.state.read();
            if state.unauthorized {
                return Err(state.terminal_error());
            }
            if state.generation != observed_generation {
                if let Some(failure) = &state.last_failure {
                    return Err(CredentialError::RefreshFailed(failure.clone()));
                }
                // An installed refresh token leaves no access token behind;
                // only a completed refresh counts as an outcome to reuse.
                if state.credential.has_access_token() {
                    debug!("Reusing outcome of concurrent refresh");
                    return Ok(state.credential.access_token.clone());
                }
            } else if !force
                && state.credential.is_usable(self.now(), self.config.refresh_skew_seconds)
            {
                return Ok(state.credential.access_token.clone());
            }
        }

        self.refresh_locked().await
    }

    /// Perform one refresh exchange. Caller holds `refresh_lock`.
    #[instrument(skip(self), fields(client_id = %self.client.client_id))]
    async fn refresh_locked(&self) -> Result<String, CredentialError> {
        let previous = self.state.read().credential.clone();
        if !previous.has_refresh_token() {
            warn!("Refresh needed but no refresh token is on record");
            return Err(CredentialError::MissingRefreshToken);
        }

        let _refreshing = RefreshingGuard::enter(&self.state);
        info!("Refreshing access token");

        let exchange =
            self.oauth_client.refresh_access_token(&self.client, &previous.refresh_token);
        let response = match tokio::time::timeout(self.config.refresh_timeout, exchange).await {
            Ok(Ok(response)) => response,
            Ok(Err(OAuthClientError::NoRefreshToken)) => {
                return Err(CredentialError::MissingRefreshToken);
            }
            Ok(Err(err)) => return Err(self.record_failure(RefreshFailure::from(err))),
            Err(_) => {
                return Err(self.record_failure(RefreshFailure::timeout(self.config.refresh_timeout)))
            }
        };

        let issued_at = self.now();
        let next =
            response.into_credential(&previous, issued_at, self.config.default_lifetime_seconds);
        if !next.has_access_token() {
            return Err(self.record_failure(RefreshFailure::new(
                super::errors::RefreshFailureKind::Malformed,
                None,
                "token endpoint returned an empty access_token",
            )));
        }
        if next.expires_at <= issued_at.saturating_add(self.config.refresh_skew_seconds) {
            warn!(
                expires_at = next.expires_at,
                "Issued token expires inside the refresh skew; next call will refresh again"
            );
        }

        let record = CredentialRecord { client: self.client.clone(), credential: next.clone() };
        let persisted = match self.store.save(&record).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "Refreshed credential could not be persisted; keeping it in memory");
                false
            }
        };

        let access_token = next.access_token.clone();
        let expires_at = next.expires_at;
        {
            let mut state = self.state.write();
            state.credential = next;
            state.generation += 1;
            state.persisted = persisted;
            state.last_failure = None;
        }

        info!(expires_at, persisted, "Access token refreshed");
        Ok(access_token)
    }

    fn record_failure(&self, failure: RefreshFailure) -> CredentialError {
        let terminal = failure.is_rejection();
        {
            let mut state = self.state.write();
            state.generation += 1;
            state.unauthorized |= terminal;
            state.last_failure = Some(failure.clone());
        }

        if terminal {
            error!(
                failure = %failure,
                "Authorization server rejected the refresh token; re-authorization required"
            );
        } else {
            warn!(failure = %failure, "Access token refresh failed");
        }

        CredentialError::RefreshFailed(failure)
    }
}

#[async_trait]
impl<C: OAuthClientTrait + 'static, S: CredentialStoreTrait + 'static> AccessTokenSource
    for TokenManager<C, S>
{
    async fn ensure_valid(&self) -> Result<String, CredentialError> {
        TokenManager::ensure_valid(self).await
    }

    async fn force_refresh(&self) -> Result<String, CredentialError> {
        TokenManager::force_refresh(self).await
    }
}
