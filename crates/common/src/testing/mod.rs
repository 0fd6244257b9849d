//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock token endpoint and in-memory credential store
//! - **[`time`]**: Mock clock for expiry tests
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tunequiz_common::auth::{
//!     ClientCredentials, Credential, CredentialRecord, TokenManager, TokenManagerConfig,
//! };
//! use tunequiz_common::testing::{MockClock, MockCredentialStore, MockOAuthClient};
//!
//! let record = CredentialRecord {
//!     client: ClientCredentials::new("client", "secret"),
//!     credential: Credential::new("", "refresh", 0),
//! };
//! let manager = TokenManager::new(
//!     Arc::new(MockOAuthClient::new()),
//!     Arc::new(MockCredentialStore::with_record(record.clone())),
//!     record,
//!     TokenManagerConfig::default(),
//! )
//! .with_clock(Arc::new(MockClock::at_unix(1_700_000_000)));
//! assert!(manager.current().has_refresh_token());
//! ```

pub mod mocks;
pub mod time;

pub use mocks::{MockCredentialStore, MockOAuthClient};
pub use time::MockClock;
