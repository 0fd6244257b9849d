//! Playlist listing

use std::io::Write;

use crate::errors::AppResult;
use crate::AppContext;

/// Print the playable tracks of a playlist, one per line
///
/// # Errors
/// Returns the catalog failure, including `AuthorizationExhausted` when
/// Spotify keeps rejecting freshly refreshed tokens.
pub async fn list_tracks(ctx: &AppContext, playlist_id: &str, out: &mut impl Write) -> AppResult<()> {
    let tracks = ctx.catalog.fetch_playlist(playlist_id).await?;

    if tracks.is_empty() {
        writeln!(out, "Playlist {playlist_id} has no playable tracks.")?;
        return Ok(());
    }

    for (index, track) in tracks.iter().enumerate() {
        if track.artists.is_empty() {
            writeln!(out, "{:>3}. {}", index + 1, track.name)?;
        } else {
            writeln!(out, "{:>3}. {} by {}", index + 1, track.name, track.artist_line())?;
        }
    }
    writeln!(out, "{} tracks", tracks.len())?;
    Ok(())
}
