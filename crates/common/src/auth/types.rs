//! OAuth 2.0 credential types
//!
//! Defines the persisted credential record, the static client credentials and
//! the token endpoint's response shape. Token values are opaque strings; an
//! empty string means "not on record".
//!
//! None of the `Debug` implementations in this module print secret material.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Token endpoint used when no override is configured
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Guard window before expiry within which a token is treated as stale
pub const DEFAULT_REFRESH_SKEW_SECS: i64 = 300;

const REDACTED: &str = "[REDACTED]";

/// Static OAuth client credentials
///
/// Immutable for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth client ID
    pub client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Create client credentials
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    /// Get the client secret
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

/// Access/refresh token pair with its policy expiry
///
/// `access_token` and `expires_at` are only ever replaced together.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token for API calls, empty before the first refresh
    pub access_token: String,

    /// Long-lived token exchanged for new access tokens, empty if never
    /// obtained
    pub refresh_token: String,

    /// Epoch seconds after which `access_token` is invalid by policy
    pub expires_at: i64,
}

impl Credential {
    /// Create a credential
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into(), expires_at }
    }

    /// Whether an access token is on record
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Whether a refresh token is on record
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Seconds between `now` and policy expiry (negative once expired)
    #[must_use]
    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// Check whether the access token may be used without refreshing
    ///
    /// True only when a token is on record and `now < expires_at - skew`.
    #[must_use]
    pub fn is_usable(&self, now: i64, skew_seconds: i64) -> bool {
        self.has_access_token() && now < self.expires_at.saturating_sub(skew_seconds)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &str| if value.is_empty() { "" } else { REDACTED };
        f.debug_struct("Credential")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Everything the credential store persists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Static client credentials
    pub client: ClientCredentials,
    /// Current token pair
    pub credential: Credential,
}

/// OAuth token response from the authorization server
///
/// Standard refresh-grant response (RFC 6749 §5.1). Only `access_token` is
/// required.
#[derive(Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token
    pub access_token: String,
    /// Lifetime in seconds; the default lifetime applies when absent
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Rotated refresh token, if the server issued one
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type, normally `Bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Space-separated granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Build the successor of `previous` issued at `issued_at`
    ///
    /// The previous refresh token is kept unless the response carries a new
    /// non-empty one. A missing `expires_in` means `default_lifetime`; a
    /// non-positive one yields a token that is already stale.
    #[must_use]
    pub fn into_credential(
        self,
        previous: &Credential,
        issued_at: i64,
        default_lifetime: i64,
    ) -> Credential {
        let lifetime = self.expires_in.unwrap_or(default_lifetime).max(0);
        let refresh_token = match self.refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => previous.refresh_token.clone(),
        };

        Credential {
            access_token: self.access_token,
            refresh_token,
            expires_at: issued_at.saturating_add(lifetime),
        }
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &REDACTED)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth client configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Token endpoint URL
    pub token_url: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(token_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self { token_url: token_url.into(), request_timeout }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_URL, Duration::from_secs(30))
    }
}

/// OAuth error response from authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthError {
    /// Error code such as `invalid_grant`
    pub error: String,
    /// Human-readable detail from the server
    pub error_description: Option<String>,
}

impl OAuthError {
    /// Describe a non-success response whose body is not an OAuth error
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let snippet: String = body.trim().chars().take(200).collect();
        Self {
            error: format!("http_{status}"),
            error_description: (!snippet.is_empty()).then_some(snippet),
        }
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
