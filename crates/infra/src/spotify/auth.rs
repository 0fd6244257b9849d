//! Credential lifecycle wiring
//!
//! Turns a [`Config`] into a token manager backed by the real token endpoint
//! and the JSON credential file.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tunequiz_common::auth::{
    CredentialError, FileCredentialStore, OAuthClient, OAuthConfig, TokenManager,
    TokenManagerConfig, DEFAULT_TOKEN_LIFETIME_SECS,
};
use tunequiz_domain::Config;

/// Token manager used against Spotify
pub type SpotifyTokenManager = TokenManager<OAuthClient, FileCredentialStore>;

/// Load persisted credentials and build the token manager
///
/// # Errors
/// Returns `CredentialError::Configuration` if the HTTP client cannot be
/// built or the credential file lacks client credentials.
pub async fn connect(config: &Config) -> Result<Arc<SpotifyTokenManager>, CredentialError> {
    let oauth = OAuthClient::new(OAuthConfig::new(
        config.spotify.token_url.clone(),
        Duration::from_secs(config.spotify.request_timeout_seconds),
    ))
    .map_err(|e| CredentialError::Configuration(format!("failed to build OAuth client: {e}")))?;

    let store = FileCredentialStore::new(&config.credentials.path);
    let manager_config = TokenManagerConfig {
        refresh_skew_seconds: config.credentials.refresh_skew_seconds,
        refresh_timeout: Duration::from_secs(config.credentials.refresh_timeout_seconds),
        default_lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECS,
    };

    let manager = TokenManager::load(Arc::new(oauth), Arc::new(store), manager_config).await?;
    info!(credentials = %config.credentials.path, "Spotify credentials loaded");
    Ok(Arc::new(manager))
}
