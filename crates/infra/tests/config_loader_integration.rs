//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use tempfile::NamedTempFile;
use tunequiz_infra::config;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "credentials": {
            "path": "/tmp/integration_credentials.json",
            "refresh_skew_seconds": 120,
            "refresh_timeout_seconds": 5
        },
        "spotify": {
            "token_url": "http://localhost:8080/api/token",
            "api_base_url": "http://localhost:8080/v1",
            "request_timeout_seconds": 3
        },
        "game": {
            "max_guesses": 4
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    let config = result.expect("Failed to load config from JSON file");

    assert_eq!(config.credentials.path, "/tmp/integration_credentials.json");
    assert_eq!(config.credentials.refresh_skew_seconds, 120);
    assert_eq!(config.credentials.refresh_timeout_seconds, 5);
    assert_eq!(config.spotify.token_url, "http://localhost:8080/api/token");
    assert_eq!(config.spotify.api_base_url, "http://localhost:8080/v1");
    assert_eq!(config.spotify.request_timeout_seconds, 3);
    assert_eq!(config.game.max_guesses, 4);
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[credentials]
path = "creds/spotify.json"

[spotify]
request_timeout_seconds = 15
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    let config = result.expect("Failed to load config from TOML file");

    assert_eq!(config.credentials.path, "creds/spotify.json");
    assert_eq!(config.credentials.refresh_skew_seconds, 300);
    assert_eq!(config.spotify.request_timeout_seconds, 15);
    assert_eq!(config.spotify.token_url, "https://accounts.spotify.com/api/token");
    assert_eq!(config.game.max_guesses, 3);
}

#[test]
fn test_load_config_invalid_json_is_config_error() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(br#"{ "game": { "max_guesses": "many" } }"#).expect("write");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(tunequiz_domain::TunequizError::Config(_))));
}
