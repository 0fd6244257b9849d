//! Conversions from infrastructure errors into domain errors.

use tunequiz_common::auth::{CredentialError, InvokeError, RefreshFailureKind, StoreError};
use tunequiz_domain::TunequizError;

use crate::spotify::CatalogError;

/// Explicit conversion into the domain error
///
/// Infrastructure errors keep their own types up to the port boundary; this
/// is where they collapse into [`TunequizError`].
pub trait IntoTunequizError {
    fn into_tunequiz(self) -> TunequizError;
}

/* -------------------------------------------------------------------------- */
/* CredentialError → TunequizError */
/* -------------------------------------------------------------------------- */

impl IntoTunequizError for CredentialError {
    fn into_tunequiz(self) -> TunequizError {
        match self {
            Self::Configuration(message) => TunequizError::Config(message),
            Self::MissingRefreshToken => {
                TunequizError::Auth("no refresh token on record; re-authorization required".into())
            }
            Self::RefreshFailed(failure) if failure.is_rejection() => TunequizError::Auth(format!(
                "refresh token rejected; re-authorization required ({failure})"
            )),
            Self::RefreshFailed(failure) if failure.kind == RefreshFailureKind::Malformed => {
                TunequizError::Internal(failure.to_string())
            }
            Self::RefreshFailed(failure) => TunequizError::Network(failure.to_string()),
            Self::Store(err) => err.into_tunequiz(),
        }
    }
}

impl IntoTunequizError for StoreError {
    fn into_tunequiz(self) -> TunequizError {
        TunequizError::Internal(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* CatalogError → TunequizError */
/* -------------------------------------------------------------------------- */

impl IntoTunequizError for CatalogError {
    fn into_tunequiz(self) -> TunequizError {
        match self {
            Self::NotFound(playlist) => TunequizError::NotFound(format!("playlist {playlist}")),
            Self::InvalidPlaylistId(id) => {
                TunequizError::InvalidInput(format!("invalid playlist ID {id:?}"))
            }
            Self::Status { status: 403, message } => {
                TunequizError::Auth(format!("access to playlist forbidden: {message}"))
            }
            Self::Status { status, message } if (400..500).contains(&status) => {
                TunequizError::InvalidInput(format!("HTTP {status}: {message}"))
            }
            Self::Parse(message) => TunequizError::Internal(message),
            other @ (Self::Http(_)
            | Self::Timeout(_)
            | Self::RateLimited { .. }
            | Self::Status { .. }) => TunequizError::Network(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* InvokeError<E> → TunequizError */
/* -------------------------------------------------------------------------- */

impl<E: IntoTunequizError> IntoTunequizError for InvokeError<E> {
    fn into_tunequiz(self) -> TunequizError {
        match self {
            Self::Credential(err) => err.into_tunequiz(),
            Self::AuthorizationExhausted => TunequizError::Auth(
                "access token rejected even after refreshing; re-authorization required".into(),
            ),
            Self::Operation(err) => err.into_tunequiz(),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
