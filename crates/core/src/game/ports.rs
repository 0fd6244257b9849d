//! Port interfaces for the quiz
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use tunequiz_domain::{Result, Track};

/// Source of playable tracks
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Get every track of a playlist, in playlist order
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;
}
