//! Credential lifecycle commands

use std::io::Write;

use tracing::info;
use tunequiz_common::auth::CredentialStatus;

use crate::errors::AppResult;
use crate::AppContext;

/// Print the credential state without contacting Spotify
///
/// # Errors
/// Fails only if the writer fails.
pub fn auth_status(ctx: &AppContext, out: &mut impl Write) -> AppResult<()> {
    let status = ctx.tokens.status();
    writeln!(out, "credentials: {}", ctx.config.credentials.path)?;
    write_status(&status, out)?;
    Ok(())
}

/// Refresh the access token now, regardless of its expiry
///
/// # Errors
/// Returns the refresh failure, including the terminal rejected state.
pub async fn auth_refresh(ctx: &AppContext, out: &mut impl Write) -> AppResult<()> {
    ctx.tokens.force_refresh().await?;
    let status = ctx.tokens.status();
    info!(expires_at = status.expires_at, "Access token refreshed on request");

    writeln!(out, "Access token refreshed.")?;
    write_status(&status, out)?;
    Ok(())
}

/// Record a refresh token obtained out of band
///
/// The token is saved first and takes effect on the next call. It is never
/// echoed back.
///
/// # Errors
/// Returns `InvalidInput` for a blank token, or the store failure.
pub async fn auth_set_refresh_token(
    ctx: &AppContext,
    refresh_token: &str,
    out: &mut impl Write,
) -> AppResult<()> {
    let refresh_token = refresh_token.trim();
    if refresh_token.is_empty() {
        return Err(tunequiz_domain::TunequizError::InvalidInput(
            "refresh token must not be empty".into(),
        )
        .into());
    }

    ctx.tokens.install_refresh_token(refresh_token).await?;
    writeln!(out, "Refresh token saved to {}.", ctx.config.credentials.path)?;
    writeln!(out, "The next command that needs Spotify will refresh the access token.")?;
    Ok(())
}

fn write_status(status: &CredentialStatus, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "state: {}", status.state)?;
    if status.expires_at > 0 {
        writeln!(out, "expires at: {} (epoch seconds)", status.expires_at)?;
        writeln!(out, "seconds until expiry: {}", status.seconds_until_expiry)?;
    } else {
        writeln!(out, "expires at: never refreshed")?;
    }
    writeln!(out, "refresh token on record: {}", yes_no(status.has_refresh_token))?;
    writeln!(out, "persisted: {}", yes_no(status.persisted))?;
    if let Some(failure) = &status.last_failure {
        writeln!(out, "last failure: {failure}")?;
    }
    Ok(())
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
