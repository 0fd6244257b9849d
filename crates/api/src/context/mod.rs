//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tunequiz_common::auth::{AccessTokenSource, ResilientInvoker};
use tunequiz_core::{GameService, TrackCatalog};
use tunequiz_domain::Config;
use tunequiz_infra::spotify::CatalogConfig;
use tunequiz_infra::{connect, SpotifyCatalog, SpotifyTokenManager};

use crate::errors::AppResult;

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Merged configuration the context was built from
    pub config: Config,
    /// Lifecycle manager for the Spotify credential
    pub tokens: Arc<SpotifyTokenManager>,
    pub catalog: Arc<SpotifyCatalog>,
    /// Rounds keyed by player
    pub game: GameService,
}

impl AppContext {
    /// Load credentials and wire the catalog and game service
    ///
    /// No network request is made here; the first refresh happens when a
    /// command needs a token.
    ///
    /// # Errors
    /// Fails if the credential file is unusable or the HTTP client cannot be
    /// built.
    pub async fn new(config: Config) -> AppResult<Self> {
        let tokens = connect(&config).await?;

        let invoker = ResilientInvoker::new(Arc::clone(&tokens) as Arc<dyn AccessTokenSource>);
        let catalog = Arc::new(SpotifyCatalog::new(
            CatalogConfig {
                api_base_url: config.spotify.api_base_url.clone(),
                request_timeout: Duration::from_secs(config.spotify.request_timeout_seconds),
            },
            invoker,
        )?);

        let game = GameService::new(config.game.max_guesses)
            .with_catalog(Arc::clone(&catalog) as Arc<dyn TrackCatalog>);

        debug!(max_guesses = config.game.max_guesses, "Application context ready");
        Ok(Self { config, tokens, catalog, game })
    }
}
