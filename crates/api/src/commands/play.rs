//! Interactive guessing round

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;
use tunequiz_domain::GuessOutcome;

use super::TERMINAL_SESSION;
use crate::errors::AppResult;
use crate::AppContext;

/// Play one round from a playlist, reading guesses line by line
///
/// The round ends on a correct guess, when the attempts run out, or when the
/// input closes. Blank lines are ignored.
///
/// # Errors
/// Returns the catalog failure if the playlist cannot be fetched, or an I/O
/// error from the terminal.
pub async fn play<R, W>(ctx: &AppContext, playlist_id: &str, input: R, out: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (track, attempts) = ctx.game.start_round_from_catalog(TERMINAL_SESSION, playlist_id).await?;
    debug!(playlist_id, attempts, "Round started");

    writeln!(out, "Guess the song! You have {attempts} attempts.")?;
    if !track.artists.is_empty() {
        writeln!(out, "Hint: by {}", track.artist_line())?;
    }
    out.flush()?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let outcome = ctx.game.guess(TERMINAL_SESSION, &line);
        match &outcome {
            GuessOutcome::Correct { .. } => {
                writeln!(out, "Correct! The song was {}.", track.name)?;
            }
            GuessOutcome::Wrong { attempts_left } => {
                writeln!(out, "Wrong. {attempts_left} attempts left.")?;
            }
            GuessOutcome::GameOver { .. } => {
                writeln!(out, "Game over! The song was {}.", track.name)?;
            }
            GuessOutcome::NoRound => break,
        }
        if outcome.ends_round() {
            return Ok(());
        }
        out.flush()?;
    }

    writeln!(out, "Round abandoned. The song was {}.", track.name)?;
    Ok(())
}
