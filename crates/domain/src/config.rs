//! Application configuration
//!
//! Plain data loaded by `tunequiz-infra::config`. Every section has defaults
//! so a config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CREDENTIALS_PATH, DEFAULT_MAX_GUESSES,
    DEFAULT_REFRESH_SKEW_SECS, DEFAULT_REFRESH_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TOKEN_URL,
};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential file and refresh policy
    pub credentials: CredentialsConfig,
    /// Spotify endpoints and HTTP timeouts
    pub spotify: SpotifyConfig,
    /// Game rules
    pub game: GameConfig,
}

/// Where credentials live and how eagerly they are refreshed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path of the JSON credential file
    pub path: String,
    /// Refresh this many seconds before the access token expires
    pub refresh_skew_seconds: i64,
    /// Upper bound on one refresh exchange
    pub refresh_timeout_seconds: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CREDENTIALS_PATH.to_string(),
            refresh_skew_seconds: DEFAULT_REFRESH_SKEW_SECS,
            refresh_timeout_seconds: DEFAULT_REFRESH_TIMEOUT_SECS,
        }
    }
}

/// Spotify endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// OAuth token endpoint used for the refresh grant
    pub token_url: String,
    /// Web API base URL; playlist page links must stay under it
    pub api_base_url: String,
    /// Timeout applied to each HTTP request
    pub request_timeout_seconds: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Quiz rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Attempts per round
    pub max_guesses: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { max_guesses: DEFAULT_MAX_GUESSES }
    }
}
