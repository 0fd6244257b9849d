//! Traits for OAuth, credential storage and token consumption
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (authorization server, credential file) and by
//! letting downstream clients ask for tokens without knowing who manages
//! them.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::errors::{CredentialError, StoreError};
use super::types::{ClientCredentials, CredentialRecord, TokenResponse};

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Refresh access token using refresh token
    ///
    /// # Arguments
    /// * `client` - Static client credentials sent with the grant
    /// * `refresh_token` - Refresh token on record
    ///
    /// # Returns
    /// The raw token endpoint response; the caller applies expiry policy
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh_access_token(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError>;
}

/// Trait for durable credential storage
///
/// Implementations do local I/O only: no retries, no network, no policy.
#[async_trait]
pub trait CredentialStoreTrait: Send + Sync {
    /// Load the persisted record
    ///
    /// Missing dynamic fields (tokens, expiry) default to empty/zero.
    ///
    /// # Errors
    /// Returns `CredentialError::Configuration` if the client ID or secret is
    /// absent, or if the record cannot be read at all
    async fn load(&self) -> Result<CredentialRecord, CredentialError>;

    /// Overwrite the persisted record with the full field set
    ///
    /// A crash mid-write must never leave a partially written record
    /// readable.
    ///
    /// # Errors
    /// Returns error if the record cannot be written
    async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError>;
}

/// Source of bearer tokens for downstream calls
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Get a token usable right now, refreshing first if it is stale
    ///
    /// # Errors
    /// Returns error if a needed refresh fails or cannot be attempted
    async fn ensure_valid(&self) -> Result<String, CredentialError>;

    /// Refresh unconditionally and return the new token
    ///
    /// # Errors
    /// Returns error if the refresh fails or cannot be attempted
    async fn force_refresh(&self) -> Result<String, CredentialError>;
}
