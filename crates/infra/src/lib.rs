//! # Tunequiz Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (environment, TOML/JSON files)
//! - Spotify integration (credential wiring, playlist catalog)
//! - Conversions from infrastructure errors into domain errors
//!
//! ## Architecture
//! - Implements traits defined in `tunequiz-core`
//! - Depends on `tunequiz-common`, `tunequiz-domain` and `tunequiz-core`
//! - Contains all "impure" code (HTTP, files, environment)

pub mod config;
pub mod errors;
pub mod spotify;

// Re-export commonly used items
pub use errors::IntoTunequizError;
pub use spotify::{connect, SpotifyCatalog, SpotifyTokenManager};
