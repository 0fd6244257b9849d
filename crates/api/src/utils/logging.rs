//! Logging setup and structured failure reporting

use anyhow::anyhow;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use tunequiz_common::auth::InvokeError;
use tunequiz_common::error::{ErrorClassification, ErrorSeverity};
use tunequiz_domain::TunequizError;

use crate::errors::AppError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so command output
/// on stdout stays clean.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Convert an `AppError` into a stable label suitable for logging.
#[inline]
#[must_use]
pub fn error_label(error: &AppError) -> &'static str {
    match error {
        AppError::Credential(_) | AppError::Catalog(InvokeError::Credential(_)) => "credential",
        AppError::Catalog(InvokeError::AuthorizationExhausted) => "authorization_exhausted",
        AppError::Catalog(InvokeError::Operation(_)) | AppError::CatalogSetup(_) => "catalog",
        AppError::Domain(err) => domain_label(err),
        AppError::Io(_) => "io",
    }
}

/// Log a failed command at the level its severity calls for
///
/// Expected conditions (unknown playlist, bad input) stay at `info`;
/// transient failures are warnings.
pub fn log_command_failure(error: &AppError) {
    let kind = error_label(error);
    let retryable = error.is_retryable();
    let retry_after_secs = error.retry_after().map(|wait| wait.as_secs());

    match error.severity() {
        ErrorSeverity::Info => {
            info!(kind, retryable, error = %error, "command_failed");
        }
        ErrorSeverity::Warning => {
            warn!(kind, retryable, retry_after_secs, error = %error, "command_failed");
        }
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(kind, retryable, critical = error.is_critical(), error = %error, "command_failed");
        }
    }
}

fn domain_label(error: &TunequizError) -> &'static str {
    match error {
        TunequizError::Config(_) => "config",
        TunequizError::Network(_) => "network",
        TunequizError::Auth(_) => "auth",
        TunequizError::NotFound(_) => "not_found",
        TunequizError::InvalidInput(_) => "invalid_input",
        TunequizError::Internal(_) => "internal",
    }
}
