//! OAuth 2.0 credential lifecycle
//!
//! Keeps a long-running process holding a valid bearer token for a
//! third-party API, using only a persisted refresh token and static client
//! credentials.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │  ResilientInvoker  │  Retry once on 401 after a forced refresh
//! └─────────┬──────────┘
//!           │ AccessTokenSource
//!           ▼
//! ┌────────────────────┐
//! │    TokenManager    │  Skew check, single-flight refresh, terminal state
//! └──┬──────────────┬──┘
//!    │              │
//!    ▼              ▼
//! OAuthClient   FileCredentialStore
//! (token        (atomic JSON writes,
//!  endpoint)     unknown keys kept)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tunequiz_common::auth::{
//!     FileCredentialStore, OAuthClient, OAuthConfig, OperationError, ResilientInvoker,
//!     TokenManager, TokenManagerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(OAuthClient::new(OAuthConfig::default())?);
//!     let store = Arc::new(FileCredentialStore::new("credentials.json"));
//!     let manager = Arc::new(TokenManager::load(client, store, TokenManagerConfig::default()).await?);
//!
//!     let invoker = ResilientInvoker::new(manager);
//!     let greeting = invoker
//!         .invoke(|token| async move {
//!             if token.is_empty() {
//!                 Err(OperationError::<std::io::Error>::Unauthorized)
//!             } else {
//!                 Ok("authorized")
//!             }
//!         })
//!         .await?;
//!     println!("{greeting}");
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: Credential, client credentials, token endpoint payloads
//! - **[`client`]**: Refresh-grant HTTP client
//! - **[`store`]**: JSON file credential store
//! - **[`token_manager`]**: Lifecycle manager
//! - **[`invoker`]**: Retry-once wrapper for authorized calls
//! - **[`errors`]**: Failure taxonomy
//!
//! Secrets (`client_secret`, access and refresh tokens) are redacted from
//! every `Debug` impl and never logged.

pub mod client;
pub mod errors;
pub mod invoker;
pub mod store;
pub mod token_manager;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use client::{OAuthClient, OAuthClientError};
pub use errors::{CredentialError, RefreshFailure, RefreshFailureKind, StoreError};
pub use invoker::{InvokeError, OperationError, ResilientInvoker};
pub use store::FileCredentialStore;
pub use token_manager::{CredentialState, CredentialStatus, TokenManager, TokenManagerConfig};
pub use traits::{AccessTokenSource, CredentialStoreTrait, OAuthClientTrait};
pub use types::{
    ClientCredentials, Credential, CredentialRecord, OAuthConfig, OAuthError, TokenResponse,
    DEFAULT_REFRESH_SKEW_SECS, DEFAULT_TOKEN_LIFETIME_SECS, DEFAULT_TOKEN_URL,
};
