//! OAuth 2.0 refresh-grant client
//!
//! Exchanges a refresh token for a new access token at the configured token
//! endpoint. The client performs exactly one HTTP request per call and applies
//! no policy of its own: deciding when to refresh, and what a failure means,
//! belongs to the token manager.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

use super::traits::OAuthClientTrait;
use super::types::{ClientCredentials, OAuthConfig, OAuthError, TokenResponse};

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed (connect, TLS, body read, client-side timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint answered with a non-success status
    #[error("OAuth error (HTTP {status}): {error}")]
    OAuthError { status: u16, error: OAuthError },

    /// Failed to parse a success response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,
}

/// OAuth 2.0 client for the refresh-token grant
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built (TLS backend
    /// initialisation failure)
    ///
    /// # Examples
    /// ```
    /// use tunequiz_common::auth::{OAuthClient, OAuthConfig};
    ///
    /// let client = OAuthClient::new(OAuthConfig::default()).unwrap();
    /// assert_eq!(client.config().token_url, "https://accounts.spotify.com/api/token");
    /// ```
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, http })
    }

    /// Refresh access token using refresh token
    ///
    /// Sends `grant_type=refresh_token` with the refresh token and client
    /// credentials as a form-encoded body.
    ///
    /// # Errors
    /// Returns error if:
    /// - No refresh token provided
    /// - The request fails in transport
    /// - The endpoint answers with a non-2xx status
    /// - The success body lacks `access_token`
    #[instrument(skip_all, fields(token_url = %self.config.token_url, client_id = %client.client_id))]
    pub async fn refresh_access_token(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret()),
        ];

        let response = self.http.post(&self.config.token_url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<OAuthError>(&body)
                .unwrap_or_else(|_| OAuthError::from_status(status.as_u16(), &body));
            debug!(status = status.as_u16(), error = %error.error, "Token endpoint rejected refresh");
            return Err(OAuthClientError::OAuthError { status: status.as_u16(), error });
        }

        let body = response.text().await?;
        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(OAuthClientError::ParseError("empty access_token in response".to_string()));
        }

        debug!(expires_in = ?token_response.expires_in, "Token endpoint issued access token");
        Ok(token_response)
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    async fn refresh_access_token(
        &self,
        client: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_access_token(client, refresh_token).await
    }
}
