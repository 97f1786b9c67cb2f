// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The remote signalled throttling. The only retryable variant.
    #[error("rate limited by catalog")]
    RateLimited,

    #[error("invalid response from catalog: {0}")]
    InvalidResponse(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::RateLimited)
    }
}

/// Heuristic throttling detection for failures the remote reports as plain
/// text rather than a 429 status. Matched once at the client boundary so the
/// retry logic only ever switches on the typed variant.
pub(crate) fn is_throttling_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("429") || lower.contains("too many") || lower.contains("rate limit")
}
