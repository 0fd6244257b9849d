//! File-backed credential store
//!
//! The credential file is a JSON object that may also carry unrelated
//! settings (for example a chat bot token). Only the `SPOTIFY_*` keys below
//! belong to the store; every other key is carried through `save` untouched.
//!
//! | Key                     | Field           | Required |
//! |-------------------------|-----------------|----------|
//! | `SPOTIFY_CLIENT_ID`     | client ID       | yes      |
//! | `SPOTIFY_CLIENT_SECRET` | client secret   | yes      |
//! | `SPOTIFY_ACCESS_TOKEN`  | access token    | no (`""`) |
//! | `SPOTIFY_REFRESH_TOKEN` | refresh token   | no (`""`) |
//! | `SPOTIFY_TOKEN_EXPIRY`  | epoch seconds   | no (`0`) |
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so readers see either the old or the new record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::errors::{CredentialError, StoreError};
use super::traits::CredentialStoreTrait;
use super::types::{ClientCredentials, Credential, CredentialRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(rename = "SPOTIFY_CLIENT_ID", default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(rename = "SPOTIFY_CLIENT_SECRET", default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(rename = "SPOTIFY_ACCESS_TOKEN", default)]
    access_token: Option<String>,
    #[serde(rename = "SPOTIFY_REFRESH_TOKEN", default)]
    refresh_token: Option<String>,
    #[serde(rename = "SPOTIFY_TOKEN_EXPIRY", default)]
    token_expiry: Option<i64>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl CredentialFile {
    fn into_record(self, path: &Path) -> Result<CredentialRecord, CredentialError> {
        let client_id = self.client_id.filter(|v| !v.is_empty());
        let client_secret = self.client_secret.filter(|v| !v.is_empty());

        let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
            return Err(CredentialError::Configuration(format!(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set in {}",
                path.display()
            )));
        };

        Ok(CredentialRecord {
            client: ClientCredentials::new(client_id, client_secret),
            credential: Credential::new(
                self.access_token.unwrap_or_default(),
                self.refresh_token.unwrap_or_default(),
                self.token_expiry.unwrap_or_default(),
            ),
        })
    }

    fn apply(&mut self, record: &CredentialRecord) {
        self.client_id = Some(record.client.client_id.clone());
        self.client_secret = Some(record.client.client_secret().to_string());
        self.access_token = Some(record.credential.access_token.clone());
        self.refresh_token = Some(record.credential.refresh_token.clone());
        self.token_expiry = Some(record.credential.expires_at);
    }
}

/// Credential store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store for the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_file(path: &Path) -> Result<CredentialFile, StoreError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&contents)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

fn encode(file: &CredentialFile) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    file.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let write_err = |source: std::io::Error| StoreError::Write { path: path.to_path_buf(), source };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    // Set file permissions to 0600 on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o600)).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn save_blocking(path: &Path, record: &CredentialRecord) -> Result<(), StoreError> {
    let mut file = if path.exists() { read_file(path)? } else { CredentialFile::default() };
    file.apply(record);

    let bytes = encode(&file)
        .map_err(|e| StoreError::Write { path: path.to_path_buf(), source: e.into() })?;
    write_atomic(path, &bytes)
}

#[async_trait]
impl CredentialStoreTrait for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<CredentialRecord, CredentialError> {
        let path = self.path.clone();
        let file = tokio::task::spawn_blocking(move || read_file(&path))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
            .map_err(|e| CredentialError::Configuration(e.to_string()))?;

        let record = file.into_record(&self.path)?;
        debug!(
            has_access_token = record.credential.has_access_token(),
            has_refresh_token = record.credential.has_refresh_token(),
            expires_at = record.credential.expires_at,
            "Loaded credential record"
        );
        Ok(record)
    }

    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || save_blocking(&path, &record))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        debug!("Credential record saved");
        Ok(())
    }
}
