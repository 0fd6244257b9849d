//! Spotify integration
//!
//! - **[`auth`]**: Builds the credential lifecycle from configuration
//! - **[`catalog`]**: Playlist tracks through the Web API
//! - **[`errors`]**: Web API failure taxonomy

pub mod auth;
pub mod catalog;
pub mod errors;
mod types;

pub use auth::{connect, SpotifyTokenManager};
pub use catalog::{CatalogConfig, SpotifyCatalog};
pub use errors::CatalogError;
