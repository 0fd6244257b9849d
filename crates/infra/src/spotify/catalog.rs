//! Spotify playlist catalog
//!
//! Lists playlist tracks through the Web API. Every page request runs
//! through the [`ResilientInvoker`], so an access token revoked early is
//! refreshed and the page fetched again once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use tracing::{debug, info, instrument, warn};
use tunequiz_common::auth::{InvokeError, OperationError, ResilientInvoker};
use tunequiz_core::TrackCatalog;
use tunequiz_domain::constants::PLAYLIST_PAGE_LIMIT;
use tunequiz_domain::{Result, Track};

use super::errors::CatalogError;
use super::types::{PlaylistItem, PlaylistPage};
use crate::errors::IntoTunequizError;

/// Spotify playlists hold at most 10,000 tracks
const MAX_PAGES: usize = 100;

/// Configuration for the catalog client
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Web API base URL (e.g., "https://api.spotify.com/v1")
    pub api_base_url: String,
    /// Timeout for each page request
    pub request_timeout: Duration,
}

/// Playlist catalog backed by the Spotify Web API
pub struct SpotifyCatalog {
    http: reqwest::Client,
    invoker: ResilientInvoker,
    config: CatalogConfig,
}

impl SpotifyCatalog {
    /// Create a new catalog client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: CatalogConfig, invoker: ResilientInvoker) -> std::result::Result<Self, CatalogError> {
        let http = reqwest::Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { http, invoker, config })
    }

    /// Fetch every track of a playlist, following `next` links
    ///
    /// # Errors
    /// - `InvokeError::Credential` if no usable token can be obtained
    /// - `InvokeError::AuthorizationExhausted` if a page is rejected twice
    /// - `InvokeError::Operation` for any other Web API failure
    #[instrument(skip(self))]
    pub async fn fetch_playlist(
        &self,
        playlist_id: &str,
    ) -> std::result::Result<Vec<Track>, InvokeError<CatalogError>> {
        if playlist_id.is_empty() || !playlist_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvokeError::Operation(CatalogError::InvalidPlaylistId(
                playlist_id.to_string(),
            )));
        }

        let base = format!("{}/", self.config.api_base_url.trim_end_matches('/'));
        let mut next = Some(format!("{base}playlists/{playlist_id}/tracks?limit={PLAYLIST_PAGE_LIMIT}"));
        let mut tracks = Vec::new();
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                debug!(pages, "Page limit reached; ignoring remaining pages");
                break;
            }
            pages += 1;

            let page =
                self.invoker.invoke(|token| self.fetch_page(&url, playlist_id, token)).await?;
            tracks.extend(page.items.into_iter().filter_map(PlaylistItem::into_track));

            // The bearer token only goes to the configured API
            if let Some(link) = page.next.as_deref() {
                if !link.starts_with(&base) {
                    warn!(pages, "Next page link points outside the API base URL");
                    return Err(InvokeError::Operation(CatalogError::Parse(format!(
                        "next page link {link:?} is outside {base}"
                    ))));
                }
            }
            next = page.next;
        }

        info!(tracks = tracks.len(), pages, "Playlist fetched");
        Ok(tracks)
    }

    async fn fetch_page(
        &self,
        url: &str,
        playlist_id: &str,
        token: String,
    ) -> std::result::Result<PlaylistPage, OperationError<CatalogError>> {
        debug!(url = %url, "GET playlist page");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| OperationError::Other(self.map_transport_error(e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(OperationError::Unauthorized);
        }
        if !status.is_success() {
            return Err(OperationError::Other(Self::map_status_error(response, playlist_id).await));
        }

        let body =
            response.text().await.map_err(|e| OperationError::Other(self.map_transport_error(e)))?;
        serde_json::from_str(&body)
            .map_err(|e| OperationError::Other(CatalogError::Parse(e.to_string())))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout(self.config.request_timeout)
        } else {
            CatalogError::Http(err)
        }
    }

    async fn map_status_error(response: reqwest::Response, playlist_id: &str) -> CatalogError {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => CatalogError::NotFound(playlist_id.to_string()),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .map(Duration::from_secs);
                CatalogError::RateLimited { retry_after }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message: String = body.trim().chars().take(200).collect();
                CatalogError::Status { status: status.as_u16(), message }
            }
        }
    }
}

#[async_trait]
impl TrackCatalog for SpotifyCatalog {
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        self.fetch_playlist(playlist_id).await.map_err(IntoTunequizError::into_tunequiz)
    }
}
