// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only client for the source catalog: the user's playlists, each
//! playlist's tracks, and the saved-tracks library. All listings follow the
//! same offset pagination and stop on the first empty page.

use crate::error::{CatalogError, Result};
use crate::models::{SourceTrackPage, WirePlaylist, WirePlaylistPage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use trackbridge_config::CatalogConfig;
use trackbridge_domain::{Playlist, PlaylistId, SourceTrack};
use url::Url;

const USER_AGENT: &str = concat!("trackbridge/", env!("CARGO_PKG_VERSION"));
const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SourceClient {
    pub fn builder() -> SourceClientBuilder {
        SourceClientBuilder::default()
    }

    pub fn from_config(catalog: &CatalogConfig) -> Result<Self> {
        Self::builder()
            .base_url(&catalog.base_url)
            .token(catalog.token.clone())
            .timeout(Duration::from_secs(catalog.timeout_secs))
            .build()
    }

    pub async fn user_playlists(&self) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();
        self.paged("me/playlists", |page: WirePlaylistPage| {
            let count = page.items.len();
            playlists.extend(page.items.into_iter().map(WirePlaylist::into_playlist));
            count
        })
        .await?;
        debug!(target: "catalog", count = playlists.len(), "source playlists fetched");
        Ok(playlists)
    }

    pub async fn playlist_tracks(&self, playlist: &PlaylistId) -> Result<Vec<SourceTrack>> {
        let path = format!("playlists/{}/tracks", playlist);
        let tracks = self.track_pages(&path).await?;
        debug!(
            target: "catalog",
            playlist = %playlist,
            count = tracks.len(),
            "playlist tracks fetched"
        );
        Ok(tracks)
    }

    /// The user's saved-tracks library ("liked songs").
    pub async fn saved_tracks(&self) -> Result<Vec<SourceTrack>> {
        let tracks = self.track_pages("me/tracks").await?;
        debug!(target: "catalog", count = tracks.len(), "saved tracks fetched");
        Ok(tracks)
    }

    async fn track_pages(&self, path: &str) -> Result<Vec<SourceTrack>> {
        let mut tracks = Vec::new();
        self.paged(path, |page: SourceTrackPage| {
            let count = page.items.len();
            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.into_track().into_source_track()),
            );
            count
        })
        .await?;
        Ok(tracks)
    }

    /// Offset pagination loop; `fold` returns the raw item count of each
    /// page so the loop stops on the first empty one.
    async fn paged<T, F>(&self, path: &str, mut fold: F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> usize,
    {
        let mut offset = 0u32;
        loop {
            let mut url = self.endpoint(path)?;
            url.query_pairs_mut()
                .append_pair("limit", &PAGE_LIMIT.to_string())
                .append_pair("offset", &offset.to_string());

            let page: T = self.get_json(url.as_str()).await?;
            let count = fold(page);
            if count == 0 {
                return Ok(());
            }
            offset += count as u32;
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url.trim_end_matches('/'), path))
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        trace!(target: "catalog", "GET {}", url);
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();

        if status == 404 {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse response: {}", e))
        })
    }
}

/// Builder for configuring a source client.
#[derive(Debug)]
pub struct SourceClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for SourceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SourceClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SourceClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SourceClient {
            client,
            base_url: self.base_url,
            token: self.token,
        })
    }
}
