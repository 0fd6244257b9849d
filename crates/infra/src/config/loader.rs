//! Configuration loader
//!
//! Loads application configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Start from the file given with `--config`, else the first probed file,
//!    else built-in defaults
//! 2. Overlay any `TUNEQUIZ_*` environment variables (environment wins)
//! 3. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TUNEQUIZ_CREDENTIALS_PATH`: Credential file path
//! - `TUNEQUIZ_TOKEN_URL`: OAuth token endpoint
//! - `TUNEQUIZ_API_BASE_URL`: Web API base URL
//! - `TUNEQUIZ_REFRESH_SKEW_SECS`: Refresh this many seconds before expiry
//! - `TUNEQUIZ_REFRESH_TIMEOUT_SECS`: Upper bound on one refresh
//! - `TUNEQUIZ_REQUEST_TIMEOUT_SECS`: Per-request HTTP timeout
//! - `TUNEQUIZ_MAX_GUESSES`: Attempts per round
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./tunequiz.toml` or `./tunequiz.json` (current working directory)
//! 2. `../tunequiz.toml` or `../tunequiz.json` (parent directory)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tunequiz_domain::{Config, Result, TunequizError};

/// Load configuration with the file-then-environment strategy
///
/// # Arguments
/// * `path` - Explicit config file. If `None`, uses [`probe_config_paths`]
///   and falls back to defaults when nothing is found.
///
/// # Errors
/// Returns `TunequizError::Config` if:
/// - The explicit file does not exist
/// - A file format is invalid
/// - An environment variable has an invalid value
/// - The merged configuration fails [`validate`]
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(found) => load_from_file(Some(found))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Check value ranges once file and environment are merged
///
/// # Errors
/// Returns `TunequizError::Config` naming the first offending setting.
pub fn validate(config: &Config) -> Result<()> {
    if config.credentials.path.trim().is_empty() {
        return Err(TunequizError::Config("Invalid credentials path: must not be empty".into()));
    }
    if config.credentials.refresh_skew_seconds < 0 {
        return Err(TunequizError::Config(format!(
            "Invalid refresh skew: {} (must not be negative)",
            config.credentials.refresh_skew_seconds
        )));
    }
    if config.credentials.refresh_timeout_seconds == 0 {
        return Err(TunequizError::Config("Invalid refresh timeout: must be at least 1 second".into()));
    }
    if config.spotify.request_timeout_seconds == 0 {
        return Err(TunequizError::Config("Invalid request timeout: must be at least 1 second".into()));
    }
    if config.game.max_guesses == 0 {
        return Err(TunequizError::Config("Invalid max guesses: must be at least 1".into()));
    }
    Ok(())
}

/// Overlay `TUNEQUIZ_*` environment variables onto `config`
///
/// Unset variables leave the corresponding field alone.
///
/// # Errors
/// Returns `TunequizError::Config` if a numeric variable cannot be parsed.
/// Ranges are checked by [`validate`].
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(path) = env_string("TUNEQUIZ_CREDENTIALS_PATH") {
        config.credentials.path = path;
    }
    if let Some(url) = env_string("TUNEQUIZ_TOKEN_URL") {
        config.spotify.token_url = url;
    }
    if let Some(url) = env_string("TUNEQUIZ_API_BASE_URL") {
        config.spotify.api_base_url = url;
    }
    if let Some(skew) = env_parse::<i64>("TUNEQUIZ_REFRESH_SKEW_SECS")? {
        config.credentials.refresh_skew_seconds = skew;
    }
    if let Some(timeout) = env_parse::<u64>("TUNEQUIZ_REFRESH_TIMEOUT_SECS")? {
        config.credentials.refresh_timeout_seconds = timeout;
    }
    if let Some(timeout) = env_parse::<u64>("TUNEQUIZ_REQUEST_TIMEOUT_SECS")? {
        config.spotify.request_timeout_seconds = timeout;
    }
    if let Some(max_guesses) = env_parse::<u32>("TUNEQUIZ_MAX_GUESSES")? {
        config.game.max_guesses = max_guesses;
    }
    Ok(())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `TunequizError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TunequizError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TunequizError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TunequizError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `TunequizError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TunequizError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TunequizError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(TunequizError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable
/// directory for `tunequiz.toml` / `tunequiz.json`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend(candidates_in(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 2] {
    [dir.join("tunequiz.toml"), dir.join("tunequiz.json")]
}

/// Non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse a numeric environment variable
///
/// # Errors
/// Returns `TunequizError::Config` naming the variable if the value does not
/// parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| TunequizError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        "TUNEQUIZ_CREDENTIALS_PATH",
        "TUNEQUIZ_TOKEN_URL",
        "TUNEQUIZ_API_BASE_URL",
        "TUNEQUIZ_REFRESH_SKEW_SECS",
        "TUNEQUIZ_REFRESH_TIMEOUT_SECS",
        "TUNEQUIZ_REQUEST_TIMEOUT_SECS",
        "TUNEQUIZ_MAX_GUESSES",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_overrides_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("TUNEQUIZ_CREDENTIALS_PATH", "/tmp/creds.json");
        std::env::set_var("TUNEQUIZ_TOKEN_URL", "http://localhost/token");
        std::env::set_var("TUNEQUIZ_API_BASE_URL", "http://localhost/v1");
        std::env::set_var("TUNEQUIZ_REFRESH_SKEW_SECS", "120");
        std::env::set_var("TUNEQUIZ_REFRESH_TIMEOUT_SECS", "4");
        std::env::set_var("TUNEQUIZ_REQUEST_TIMEOUT_SECS", "7");
        std::env::set_var("TUNEQUIZ_MAX_GUESSES", "5");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        clear_env();

        assert!(result.is_ok(), "Should apply env vars, error: {:?}", result.err());
        assert_eq!(config.credentials.path, "/tmp/creds.json");
        assert_eq!(config.credentials.refresh_skew_seconds, 120);
        assert_eq!(config.credentials.refresh_timeout_seconds, 4);
        assert_eq!(config.spotify.token_url, "http://localhost/token");
        assert_eq!(config.spotify.api_base_url, "http://localhost/v1");
        assert_eq!(config.spotify.request_timeout_seconds, 7);
        assert_eq!(config.game.max_guesses, 5);
    }

    #[test]
    fn test_env_overrides_unset_keep_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let mut config = Config::default();
        apply_env_overrides(&mut config).expect("no vars set");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("TUNEQUIZ_REFRESH_SKEW_SECS", "five minutes");

        let result = apply_env_overrides(&mut Config::default());
        clear_env();

        let err = result.expect_err("Should fail with invalid skew");
        assert!(matches!(err, TunequizError::Config(ref msg) if msg.contains("TUNEQUIZ_REFRESH_SKEW_SECS")));
    }

    fn write_toml(contents: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file.write_all(contents.as_bytes()).expect("write");
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).expect("copy");
        path
    }

    #[test]
    fn test_env_zero_guesses_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let path = write_toml("[game]\nmax_guesses = 4\n");

        std::env::set_var("TUNEQUIZ_MAX_GUESSES", "0");
        let result = load(Some(path.clone()));
        clear_env();
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(TunequizError::Config(ref msg)) if msg.contains("max guesses")));
    }

    #[test]
    fn test_file_out_of_range_values_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let cases = [
            ("[credentials]\nrefresh_skew_seconds = -600\n", "refresh skew"),
            ("[credentials]\nrefresh_timeout_seconds = 0\n", "refresh timeout"),
            ("[spotify]\nrequest_timeout_seconds = 0\n", "request timeout"),
            ("[game]\nmax_guesses = 0\n", "max guesses"),
        ];
        for (contents, setting) in cases {
            let path = write_toml(contents);
            let result = load(Some(path.clone()));
            std::fs::remove_file(path).ok();

            assert!(
                matches!(result, Err(TunequizError::Config(ref msg)) if msg.contains(setting)),
                "{setting} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_env_can_repair_file_value() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let path = write_toml("[credentials]\nrefresh_skew_seconds = -1\n");

        std::env::set_var("TUNEQUIZ_REFRESH_SKEW_SECS", "60");
        let result = load(Some(path.clone()));
        clear_env();
        std::fs::remove_file(path).ok();

        assert_eq!(result.expect("merged config is valid").credentials.refresh_skew_seconds, 60);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_env_wins_over_file() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let path = write_toml("[game]\nmax_guesses = 4\n");

        std::env::set_var("TUNEQUIZ_MAX_GUESSES", "9");
        let result = load(Some(path.clone()));
        clear_env();
        std::fs::remove_file(path).ok();

        assert_eq!(result.expect("config loads").game.max_guesses, 9);
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "credentials": { "path": "secrets/creds.json" },
            "spotify": { "api_base_url": "http://localhost:9000/v1" }
        }"#;

        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file.write_all(json_content.as_bytes()).expect("write");
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).expect("copy");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("Should load config from JSON file");
        assert_eq!(config.credentials.path, "secrets/creds.json");
        assert_eq!(config.credentials.refresh_skew_seconds, 300);
        assert_eq!(config.spotify.api_base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/tunequiz.toml")));
        assert!(matches!(result, Err(TunequizError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let result = parse_config("[game\nmax_guesses = ", Path::new("tunequiz.toml"));
        assert!(matches!(result, Err(TunequizError::Config(ref msg)) if msg.contains("TOML")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("tunequiz.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
