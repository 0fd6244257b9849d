//! # Tunequiz Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Quiz rules (rounds, guesses, attempts)
//! - Port interfaces (traits) for the music catalog
//!
//! ## Architecture Principles
//! - Only depends on `tunequiz-domain`
//! - No HTTP, file or credential code
//! - All external dependencies via traits

pub mod game;

// Re-export specific items to avoid ambiguity
pub use game::ports::TrackCatalog;
pub use game::GameService;
