//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Credential lifecycle
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_REFRESH_SKEW_SECS: i64 = 300;
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

// Spotify endpoints
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// Page size requested from the playlist tracks endpoint (API maximum is 100)
pub const PLAYLIST_PAGE_LIMIT: u32 = 100;

// Game rules
pub const DEFAULT_MAX_GUESSES: u32 = 3;
