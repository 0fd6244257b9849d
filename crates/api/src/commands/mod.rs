//! CLI commands
//!
//! Each command writes its report to the given writer so it can be driven
//! from tests with an in-memory buffer.

pub mod auth;
pub mod play;
pub mod tracks;

pub use auth::{auth_refresh, auth_set_refresh_token, auth_status};
pub use play::play;
pub use tracks::list_tracks;

/// Session key for rounds played from the terminal
pub const TERMINAL_SESSION: &str = "terminal";
