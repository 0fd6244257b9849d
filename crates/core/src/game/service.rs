//! Game session service - core business logic

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tracing::{debug, info};
use tunequiz_domain::{GuessOutcome, Result, Track, TunequizError};

use super::ports::TrackCatalog;

#[derive(Debug)]
struct Round {
    answer: String,
    attempts_left: u32,
}

/// Runs one guessing round per session
///
/// A session is whatever scope the front end plays in (a chat channel, a
/// terminal). Starting a round replaces any round already running there.
pub struct GameService {
    catalog: Option<Arc<dyn TrackCatalog>>,
    max_guesses: u32,
    rounds: Mutex<HashMap<String, Round>>,
}

impl GameService {
    /// Create a game service allowing `max_guesses` attempts per round
    #[must_use]
    pub fn new(max_guesses: u32) -> Self {
        Self { catalog: None, max_guesses: max_guesses.max(1), rounds: Mutex::new(HashMap::new()) }
    }

    /// Attach a catalog for [`GameService::start_round_from_catalog`]
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn TrackCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Start a round with a known answer and return the attempt count
    ///
    /// # Errors
    /// Returns `TunequizError::InvalidInput` if the answer is blank.
    pub fn start_round(&self, session_id: &str, answer: &str) -> Result<u32> {
        let answer = normalize(answer);
        if answer.is_empty() {
            return Err(TunequizError::InvalidInput("answer must not be empty".into()));
        }

        let replaced = self
            .rounds
            .lock()
            .insert(session_id.to_string(), Round { answer, attempts_left: self.max_guesses })
            .is_some();

        info!(session_id, attempts = self.max_guesses, replaced, "Round started");
        Ok(self.max_guesses)
    }

    /// Pick a random track from `playlist_id` and start a round with it
    ///
    /// # Errors
    /// - `Config` if no catalog is attached
    /// - `NotFound` if the playlist has no tracks
    /// - Any catalog error
    pub async fn start_round_from_catalog(
        &self,
        session_id: &str,
        playlist_id: &str,
    ) -> Result<(Track, u32)> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| TunequizError::Config("no track catalog configured".into()))?;

        let tracks = catalog.playlist_tracks(playlist_id).await?;
        let track = tracks
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| TunequizError::NotFound(format!("playlist {playlist_id} has no tracks")))?;

        debug!(session_id, playlist_id, candidates = tracks.len(), "Picked track for round");
        let attempts = self.start_round(session_id, &track.name)?;
        Ok((track, attempts))
    }

    /// Score a guess against the running round
    pub fn guess(&self, session_id: &str, query: &str) -> GuessOutcome {
        let mut rounds = self.rounds.lock();
        let Some(round) = rounds.get_mut(session_id) else {
            return GuessOutcome::NoRound;
        };

        if normalize(query) == round.answer {
            let answer = round.answer.clone();
            rounds.remove(session_id);
            info!(session_id, "Round won");
            return GuessOutcome::Correct { answer };
        }

        round.attempts_left = round.attempts_left.saturating_sub(1);
        if round.attempts_left > 0 {
            return GuessOutcome::Wrong { attempts_left: round.attempts_left };
        }

        let answer = round.answer.clone();
        rounds.remove(session_id);
        info!(session_id, "Round lost");
        GuessOutcome::GameOver { answer }
    }

    /// Whether a round is running for the session
    #[must_use]
    pub fn has_round(&self, session_id: &str) -> bool {
        self.rounds.lock().contains_key(session_id)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FixedCatalog(Vec<Track>);

    #[async_trait]
    impl TrackCatalog for FixedCatalog {
        async fn playlist_tracks(&self, _playlist_id: &str) -> Result<Vec<Track>> {
            Ok(self.0.clone())
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl TrackCatalog for FailingCatalog {
        async fn playlist_tracks(&self, _playlist_id: &str) -> Result<Vec<Track>> {
            Err(TunequizError::Auth("re-authorization required".into()))
        }
    }

    fn track(name: &str) -> Track {
        Track { id: name.to_lowercase(), name: name.to_string(), artists: vec!["Artist".into()] }
    }

    #[test]
    fn test_correct_guess_ends_round() {
        let game = GameService::new(3);
        assert_eq!(game.start_round("c1", "Bohemian Rhapsody").expect("start"), 3);

        let outcome = game.guess("c1", "  bohemian RHAPSODY ");

        assert_eq!(outcome, GuessOutcome::Correct { answer: "bohemian rhapsody".into() });
        assert!(!game.has_round("c1"));
    }

    #[test]
    fn test_wrong_guesses_until_game_over() {
        let game = GameService::new(3);
        game.start_round("c1", "Song").expect("start");

        assert_eq!(game.guess("c1", "nope"), GuessOutcome::Wrong { attempts_left: 2 });
        assert_eq!(game.guess("c1", "still no"), GuessOutcome::Wrong { attempts_left: 1 });
        assert_eq!(game.guess("c1", "never"), GuessOutcome::GameOver { answer: "song".into() });
        assert_eq!(game.guess("c1", "song"), GuessOutcome::NoRound);
    }

    #[test]
    fn test_sessions_are_independent() {
        let game = GameService::new(2);
        game.start_round("a", "one").expect("start");
        game.start_round("b", "two").expect("start");

        assert_eq!(game.guess("a", "two"), GuessOutcome::Wrong { attempts_left: 1 });
        assert_eq!(game.guess("b", "two"), GuessOutcome::Correct { answer: "two".into() });
        assert!(game.has_round("a"));
    }

    #[test]
    fn test_restart_replaces_round() {
        let game = GameService::new(3);
        game.start_round("c1", "first").expect("start");
        game.guess("c1", "x");
        game.start_round("c1", "second").expect("restart");

        assert_eq!(game.guess("c1", "x"), GuessOutcome::Wrong { attempts_left: 2 });
        assert_eq!(game.guess("c1", "second"), GuessOutcome::Correct { answer: "second".into() });
    }

    #[test]
    fn test_guess_without_round() {
        let game = GameService::new(3);
        assert_eq!(game.guess("nowhere", "anything"), GuessOutcome::NoRound);
    }

    #[test]
    fn test_blank_answer_rejected() {
        let game = GameService::new(3);
        assert!(matches!(game.start_round("c1", "   "), Err(TunequizError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_round_from_catalog() {
        let game = GameService::new(3).with_catalog(Arc::new(FixedCatalog(vec![track("Hey Jude")])));

        let (picked, attempts) =
            game.start_round_from_catalog("c1", "playlist").await.expect("round starts");

        assert_eq!(picked.name, "Hey Jude");
        assert_eq!(attempts, 3);
        assert_eq!(game.guess("c1", "hey jude"), GuessOutcome::Correct { answer: "hey jude".into() });
    }

    #[tokio::test]
    async fn test_round_from_empty_playlist() {
        let game = GameService::new(3).with_catalog(Arc::new(FixedCatalog(Vec::new())));

        let result = game.start_round_from_catalog("c1", "empty").await;
        assert!(matches!(result, Err(TunequizError::NotFound(_))));
        assert!(!game.has_round("c1"));
    }

    #[tokio::test]
    async fn test_round_from_catalog_propagates_errors() {
        let game = GameService::new(3).with_catalog(Arc::new(FailingCatalog));

        let result = game.start_round_from_catalog("c1", "p").await;
        assert!(matches!(result, Err(TunequizError::Auth(_))));
    }

    #[tokio::test]
    async fn test_round_from_catalog_without_catalog() {
        let game = GameService::new(3);
        let result = game.start_round_from_catalog("c1", "p").await;
        assert!(matches!(result, Err(TunequizError::Config(_))));
    }
}
