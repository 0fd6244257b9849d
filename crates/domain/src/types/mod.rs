//! Domain data types

use serde::{Deserialize, Serialize};

/// A playlist track as the quiz sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track ID (empty for local files)
    pub id: String,
    /// Track title, which is the answer of a round
    pub name: String,
    /// Artist names in credit order
    pub artists: Vec<String>,
}

impl Track {
    /// Comma-separated artist names
    #[must_use]
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Result of one guess in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GuessOutcome {
    /// No round is running for the session
    NoRound,
    /// The guess matched; the round is over
    Correct { answer: String },
    /// The guess missed and attempts remain
    Wrong { attempts_left: u32 },
    /// The last attempt missed; the round is over
    GameOver { answer: String },
}

impl GuessOutcome {
    /// Whether the round ended with this guess
    #[must_use]
    pub fn ends_round(&self) -> bool {
        matches!(self, Self::Correct { .. } | Self::GameOver { .. })
    }
}
