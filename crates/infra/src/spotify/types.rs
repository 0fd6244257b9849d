//! Web API wire types for the playlist tracks endpoint

use serde::Deserialize;
use tunequiz_domain::Track;

/// One page of `GET /playlists/{id}/tracks`
#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    /// Null for tracks removed from the catalog
    #[serde(default)]
    track: Option<WireTrack>,
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    /// Null for local files
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<WireArtist>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    name: String,
}

impl PlaylistItem {
    /// Playable music track, skipping removed entries and podcast episodes
    pub(crate) fn into_track(self) -> Option<Track> {
        let track = self.track?;
        if track.kind.as_deref() == Some("episode") || track.name.trim().is_empty() {
            return None;
        }

        Some(Track {
            id: track.id.unwrap_or_default(),
            name: track.name,
            artists: track.artists.into_iter().map(|artist| artist.name).collect(),
        })
    }
}
