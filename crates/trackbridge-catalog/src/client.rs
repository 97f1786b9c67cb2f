// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{is_throttling_message, CatalogError, Result};
use crate::models::{SearchResponseBody, WirePlaylist, WirePlaylistPage, WireTrack};
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, trace, warn};
use trackbridge_config::{CatalogConfig, SearchConfig};
use trackbridge_domain::{CandidateId, CandidateTrack, Playlist, PlaylistId};
use url::Url;

const USER_AGENT: &str = concat!("trackbridge/", env!("CARGO_PKG_VERSION"));

/// Backoff schedule for throttled calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Upper bound of the random jitter added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            jitter: Duration::from_millis(250),
        }
    }
}

/// Search over the destination catalog, absorbing expected failures.
///
/// An empty result means "nothing usable came back for this query" — the
/// caller cannot and should not distinguish throttling exhaustion, remote
/// errors, and genuinely empty result sets.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Vec<CandidateTrack>;
}

/// Destination-side playlist and favorites writes.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    async fn get_or_create_playlist(&self, title: &str, description: &str) -> Result<Playlist>;
    async fn add_playlist_tracks(&self, playlist: &PlaylistId, tracks: &[CandidateId])
        -> Result<()>;
    async fn add_favorite_tracks(&self, tracks: &[CandidateId]) -> Result<()>;
}

/// Authenticated client for the destination catalog.
#[derive(Debug, Clone)]
pub struct DestinationClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl DestinationClient {
    pub fn builder() -> DestinationClientBuilder {
        DestinationClientBuilder::default()
    }

    /// Build a client from configuration sections.
    pub fn from_config(catalog: &CatalogConfig, search: &SearchConfig) -> Result<Self> {
        Self::builder()
            .base_url(&catalog.base_url)
            .token(catalog.token.clone())
            .timeout(Duration::from_secs(catalog.timeout_secs))
            .rate_limiter(RateLimiter::new(
                search.max_concurrent,
                Duration::from_millis(search.pacing_ms),
            ))
            .retry(RetryPolicy {
                max_retries: search.max_retries,
                initial_backoff: Duration::from_millis(search.initial_backoff_ms),
                max_backoff: Duration::from_millis(search.max_backoff_ms),
                ..RetryPolicy::default()
            })
            .build()
    }

    /// Search the catalog's track index. Throttling is retried with
    /// exponential backoff up to the policy ceiling; every other failure is
    /// returned immediately.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<CandidateTrack>> {
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 0u32;

        loop {
            match self.search_once(query, limit).await {
                Ok(tracks) => return Ok(tracks),
                Err(CatalogError::RateLimited) if attempt < self.retry.max_retries => {
                    let jitter_ms = self.retry.jitter.as_millis() as u64;
                    let jitter = if jitter_ms == 0 {
                        Duration::ZERO
                    } else {
                        Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
                    };
                    let wait = backoff + jitter;
                    warn!(
                        target: "catalog",
                        attempt,
                        query,
                        "throttled, backing off {:?}",
                        wait
                    );
                    sleep(wait).await;
                    backoff = (backoff * 2).min(self.retry.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn search_once(&self, query: &str, limit: u32) -> Result<Vec<CandidateTrack>> {
        let _permit = self.rate_limiter.acquire().await;

        let mut url = self.endpoint("search/tracks")?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());

        let body = self.get_text(url.as_str()).await?;
        let parsed: SearchResponseBody = serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse search response: {}", e))
        })?;

        Ok(parsed
            .into_tracks()
            .into_iter()
            .filter_map(WireTrack::into_candidate)
            .collect())
    }

    /// List the user's playlists, following offset pagination to the end.
    pub async fn user_playlists(&self) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();
        let mut offset = 0u32;
        const PAGE: u32 = 50;

        loop {
            let mut url = self.endpoint("me/playlists")?;
            url.query_pairs_mut()
                .append_pair("limit", &PAGE.to_string())
                .append_pair("offset", &offset.to_string());

            let page: WirePlaylistPage = self.get_json(url.as_str()).await?;
            if page.items.is_empty() {
                break;
            }
            offset += page.items.len() as u32;
            playlists.extend(page.items.into_iter().map(WirePlaylist::into_playlist));
        }

        Ok(playlists)
    }

    pub async fn create_playlist(&self, title: &str, description: &str) -> Result<Playlist> {
        let url = self.endpoint("me/playlists")?;
        let body = serde_json::json!({ "title": title, "description": description });
        let playlist: WirePlaylist = self.post_json(url.as_str(), &body).await?;
        debug!(target: "catalog", title, id = %playlist.id, "playlist created");
        Ok(playlist.into_playlist())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url.trim_end_matches('/'), path))
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        trace!(target: "catalog", "GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::check_status(url, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse response: {}", e))
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        trace!(target: "catalog", "POST {}", url);
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;
        let text = Self::check_status(url, response).await?;
        serde_json::from_str(&text).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse response: {}", e))
        })
    }

    async fn check_status(url: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        debug!(target: "catalog", "response status: {}", status);

        if status == 429 {
            return Err(CatalogError::RateLimited);
        }
        if status == 404 {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            if is_throttling_message(&message) {
                return Err(CatalogError::RateLimited);
            }
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TrackSearch for DestinationClient {
    async fn search(&self, query: &str, limit: u32) -> Vec<CandidateTrack> {
        match self.search_tracks(query, limit).await {
            Ok(tracks) => tracks,
            Err(CatalogError::RateLimited) => {
                warn!(target: "catalog", query, "retries exhausted, degrading to empty result");
                Vec::new()
            }
            Err(e) => {
                warn!(target: "catalog", query, error = %e, "search failed, degrading to empty result");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PlaylistWriter for DestinationClient {
    async fn get_or_create_playlist(&self, title: &str, description: &str) -> Result<Playlist> {
        let existing = self.user_playlists().await?;
        if let Some(playlist) = existing
            .into_iter()
            .find(|p| p.title.eq_ignore_ascii_case(title))
        {
            debug!(target: "catalog", title, id = %playlist.id, "reusing existing playlist");
            return Ok(playlist);
        }
        self.create_playlist(title, description).await
    }

    async fn add_playlist_tracks(
        &self,
        playlist: &PlaylistId,
        tracks: &[CandidateId],
    ) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }
        let url = self.endpoint(&format!("playlists/{}/tracks", playlist))?;
        let ids: Vec<&str> = tracks.iter().map(|t| t.as_str()).collect();
        let body = serde_json::json!({ "track_ids": ids });
        let response = self
            .authorize(self.client.post(url.as_str()))
            .json(&body)
            .send()
            .await?;
        Self::check_status(url.as_str(), response).await?;
        debug!(target: "catalog", playlist = %playlist, count = tracks.len(), "tracks added to playlist");
        Ok(())
    }

    async fn add_favorite_tracks(&self, tracks: &[CandidateId]) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }
        let url = self.endpoint("me/favorites/tracks")?;
        let ids: Vec<&str> = tracks.iter().map(|t| t.as_str()).collect();
        let body = serde_json::json!({ "track_ids": ids });
        let response = self
            .authorize(self.client.post(url.as_str()))
            .json(&body)
            .send()
            .await?;
        Self::check_status(url.as_str(), response).await?;
        debug!(target: "catalog", count = tracks.len(), "tracks added to favorites");
        Ok(())
    }
}

/// Builder for configuring a destination client.
#[derive(Debug)]
pub struct DestinationClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl Default for DestinationClientBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout: Duration::from_secs(30),
            rate_limiter: RateLimiter::destination_default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl DestinationClientBuilder {
    /// Set the API base URL (useful for testing with mock servers).
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

    /// Inject a rate limiter; tests substitute a permissive one here.
    pub fn rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<DestinationClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(DestinationClient {
            client,
            base_url: self.base_url,
            token: self.token,
            rate_limiter: self.rate_limiter,
            retry: self.retry,
        })
    }
}
