//! # Tunequiz CLI
//!
//! Operator front end for the credential lifecycle and the guessing game.
//!
//! This crate contains:
//! - Commands (auth status/refresh/set-refresh-token, tracks, play)
//! - Application context (dependency injection)
//! - Operator-facing error messages and logging setup
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod errors;
pub mod utils;

pub use context::AppContext;
pub use errors::{user_message, AppError, AppResult};
