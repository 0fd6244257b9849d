//! Command errors and the operator-facing messages they map to

use std::time::Duration;

use thiserror::Error;
use tunequiz_common::auth::{CredentialError, InvokeError, RefreshFailureKind};
use tunequiz_common::error::{ErrorClassification, ErrorSeverity};
use tunequiz_domain::TunequizError;
use tunequiz_infra::spotify::CatalogError;

/// Failure of a CLI command
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Catalog(#[from] InvokeError<CatalogError>),

    #[error(transparent)]
    CatalogSetup(#[from] CatalogError),

    #[error(transparent)]
    Domain(#[from] TunequizError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI commands
pub type AppResult<T> = std::result::Result<T, AppError>;

impl ErrorClassification for AppError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Credential(err) => err.is_retryable(),
            Self::Catalog(err) => err.is_retryable(),
            Self::CatalogSetup(err) => err.is_retryable(),
            Self::Domain(err) => matches!(err, TunequizError::Network(_)),
            Self::Io(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Credential(err) => err.severity(),
            Self::Catalog(err) => err.severity(),
            Self::CatalogSetup(err) => err.severity(),
            Self::Domain(err) => match err {
                TunequizError::Config(_) | TunequizError::Auth(_) => ErrorSeverity::Critical,
                TunequizError::Network(_) => ErrorSeverity::Warning,
                TunequizError::NotFound(_) | TunequizError::InvalidInput(_) => ErrorSeverity::Info,
                TunequizError::Internal(_) => ErrorSeverity::Error,
            },
            Self::Io(_) => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Catalog(err) => err.retry_after(),
            Self::CatalogSetup(err) => err.retry_after(),
            _ => None,
        }
    }
}

const REAUTHORIZE: &str =
    "Obtain a new refresh token and run `tunequiz auth set-refresh-token <TOKEN>`.";

/// Actionable message for the operator
///
/// Every error kind gets its own wording. Messages never include token
/// material since none of the wrapped errors carry any.
#[must_use]
pub fn user_message(error: &AppError) -> String {
    match error {
        AppError::Credential(err) => credential_message(err),
        AppError::Catalog(err) => invoke_message(err),
        AppError::CatalogSetup(err) => catalog_message(err),
        AppError::Domain(err) => domain_message(err),
        AppError::Io(err) => format!("Could not read from or write to the terminal: {err}."),
    }
}

fn credential_message(error: &CredentialError) -> String {
    match error {
        CredentialError::Configuration(detail) => format!(
            "Spotify client credentials are not usable ({detail}). Add SPOTIFY_CLIENT_ID and \
             SPOTIFY_CLIENT_SECRET to the credential file."
        ),
        CredentialError::MissingRefreshToken => {
            format!("No Spotify refresh token is on record. {REAUTHORIZE}")
        }
        CredentialError::RefreshFailed(failure) if failure.is_rejection() => {
            format!("Spotify rejected the stored refresh token. {REAUTHORIZE}")
        }
        CredentialError::RefreshFailed(failure) => match failure.kind {
            RefreshFailureKind::Timeout => {
                "Spotify did not answer the token refresh in time. Try again shortly.".to_string()
            }
            RefreshFailureKind::Malformed => format!(
                "Spotify answered the token refresh with an unusable response ({}).",
                failure.message
            ),
            _ => format!("Could not refresh the Spotify token ({failure}). Try again shortly."),
        },
        CredentialError::Store(err) => format!(
            "Could not access the credential file ({err}). Check that the path exists and is \
             writable."
        ),
    }
}

fn invoke_message(error: &InvokeError<CatalogError>) -> String {
    match error {
        InvokeError::Credential(err) => credential_message(err),
        InvokeError::AuthorizationExhausted => format!(
            "Spotify kept rejecting the access token even after a refresh. {REAUTHORIZE}"
        ),
        InvokeError::Operation(err) => catalog_message(err),
    }
}

fn catalog_message(error: &CatalogError) -> String {
    match error {
        CatalogError::NotFound(playlist) => {
            format!("Playlist {playlist} does not exist or is not visible to this account.")
        }
        CatalogError::InvalidPlaylistId(id) => {
            format!("{id:?} is not a playlist ID. Use the ID from the playlist's share link.")
        }
        CatalogError::RateLimited { retry_after: Some(wait) } => {
            format!("Spotify is rate limiting requests. Retry in {} seconds.", wait.as_secs())
        }
        CatalogError::RateLimited { retry_after: None } => {
            "Spotify is rate limiting requests. Retry in a moment.".to_string()
        }
        CatalogError::Timeout(after) => {
            format!("Spotify did not answer within {} seconds. Try again shortly.", after.as_secs())
        }
        CatalogError::Http(err) => format!("Could not reach Spotify ({err})."),
        CatalogError::Status { status, message } => {
            format!("Spotify returned HTTP {status}: {message}")
        }
        CatalogError::Parse(detail) => {
            format!("Spotify returned a playlist page that could not be read ({detail}).")
        }
    }
}

fn domain_message(error: &TunequizError) -> String {
    match error {
        TunequizError::Config(detail) => {
            format!("Configuration problem: {detail}. Check tunequiz.toml and TUNEQUIZ_* variables.")
        }
        TunequizError::Network(detail) => format!("Network problem: {detail}. Try again shortly."),
        TunequizError::Auth(detail) => format!("Authorization problem: {detail}. {REAUTHORIZE}"),
        TunequizError::NotFound(detail) => format!("Nothing to play: {detail} was not found."),
        TunequizError::InvalidInput(detail) => format!("Invalid input: {detail}."),
        TunequizError::Internal(detail) => format!("Unexpected failure: {detail}."),
    }
}
