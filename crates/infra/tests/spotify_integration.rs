//! Integration tests for the Spotify wiring
//!
//! Builds the whole stack from a `Config` (credential file, token endpoint,
//! Web API) against a wiremock server and plays a round from a playlist.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tempfile::TempDir;
use tunequiz_common::auth::{AccessTokenSource, ResilientInvoker};
use tunequiz_core::{GameService, TrackCatalog};
use tunequiz_domain::{Config, GuessOutcome, TunequizError};
use tunequiz_infra::spotify::CatalogConfig;
use tunequiz_infra::{connect, SpotifyCatalog};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unix_now() -> i64 {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock after epoch").as_secs();
    i64::try_from(secs).expect("fits in i64")
}

fn config_for(server: &MockServer, dir: &TempDir, credentials: &Value) -> Config {
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, credentials.to_string()).expect("write credentials");

    let mut config = Config::default();
    config.credentials.path = path.display().to_string();
    config.spotify.token_url = format!("{}/api/token", server.uri());
    config.spotify.api_base_url = format!("{}/v1", server.uri());
    config
}

async fn catalog_for(config: &Config) -> Arc<SpotifyCatalog> {
    let manager = connect(config).await.expect("credentials load");
    let invoker = ResilientInvoker::new(manager as Arc<dyn AccessTokenSource>);
    let catalog = SpotifyCatalog::new(
        CatalogConfig {
            api_base_url: config.spotify.api_base_url.clone(),
            request_timeout: std::time::Duration::from_secs(config.spotify.request_timeout_seconds),
        },
        invoker,
    )
    .expect("catalog builds");
    Arc::new(catalog)
}

/// Validates a round started from a playlist after an expired token was
/// refreshed and persisted.
#[tokio::test(flavor = "multi_thread")]
async fn test_round_from_playlist_with_expired_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "AT2", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/quiz1/tracks"))
        .and(header("authorization", "Bearer AT2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"track": {"id": "t1", "name": "Wonderwall", "artists": [{"name": "Oasis"}]}}],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let config = config_for(
        &server,
        &dir,
        &json!({
            "SPOTIFY_CLIENT_ID": "client",
            "SPOTIFY_CLIENT_SECRET": "secret",
            "SPOTIFY_ACCESS_TOKEN": "AT1",
            "SPOTIFY_REFRESH_TOKEN": "RT1",
            "SPOTIFY_TOKEN_EXPIRY": unix_now() - 1,
            "DISCORD_TOKEN": "unrelated"
        }),
    );

    let catalog = catalog_for(&config).await;
    let game = GameService::new(config.game.max_guesses).with_catalog(catalog);

    let (track, attempts) = game.start_round_from_catalog("terminal", "quiz1").await.expect("round");
    assert_eq!(track.name, "Wonderwall");
    assert_eq!(attempts, 3);
    assert_eq!(game.guess("terminal", "wonderwall"), GuessOutcome::Correct { answer: "wonderwall".into() });

    let stored: Value = serde_json::from_str(
        &std::fs::read_to_string(&config.credentials.path).expect("read credentials"),
    )
    .expect("valid JSON");
    assert_eq!(stored["SPOTIFY_ACCESS_TOKEN"], "AT2");
    assert_eq!(stored["DISCORD_TOKEN"], "unrelated");
}

/// Validates that a revoked refresh token surfaces as an auth error.
#[tokio::test(flavor = "multi_thread")]
async fn test_revoked_refresh_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let config = config_for(
        &server,
        &dir,
        &json!({
            "SPOTIFY_CLIENT_ID": "client",
            "SPOTIFY_CLIENT_SECRET": "secret",
            "SPOTIFY_REFRESH_TOKEN": "RT-revoked"
        }),
    );

    let catalog = catalog_for(&config).await;
    let first = catalog.playlist_tracks("quiz1").await;
    let second = catalog.playlist_tracks("quiz1").await;

    assert!(matches!(first, Err(TunequizError::Auth(_))));
    assert!(matches!(second, Err(TunequizError::Auth(_))));
}
