// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Connection settings for one catalog endpoint. Authentication flows live
/// outside this tool; it only carries an already-issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Limits for the destination search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum simultaneous in-flight search calls.
    pub max_concurrent: usize,
    /// Pacing delay applied before every call, in milliseconds.
    pub pacing_ms: u64,
    /// Retry ceiling for throttled calls.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Result page size requested per search query.
    pub limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            pacing_ms: 100,
            max_retries: 4,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            limit: 10,
        }
    }
}

/// Per-signal score contributions. The defaults are empirically tuned;
/// change them together or matching quality degrades in surprising ways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub title_exact: i32,
    pub title_strong_overlap: i32,
    pub title_partial_overlap: i32,
    pub artist_strong: i32,
    pub artist_moderate: i32,
    pub artist_weak: i32,
    pub artist_disjoint: i32,
    pub duration_tight: i32,
    pub duration_close: i32,
    pub duration_loose: i32,
    pub duration_far: i32,
    pub quality_hi_res: i32,
    pub quality_lossless: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title_exact: 50,
            title_strong_overlap: 30,
            title_partial_overlap: 15,
            artist_strong: 40,
            artist_moderate: 25,
            artist_weak: 10,
            artist_disjoint: -40,
            duration_tight: 30,
            duration_close: 20,
            duration_loose: 10,
            duration_far: -30,
            quality_hi_res: 5,
            quality_lossless: 3,
        }
    }
}

/// Resolution thresholds and normalization behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum total score a winner must reach.
    pub accept_threshold: i32,
    /// Threshold used when the winner's normalized title is exact and its
    /// duration is within five seconds.
    pub relaxed_threshold: i32,
    /// Duration score the winner needs before the relaxed threshold applies.
    pub relaxed_duration_floor: i32,
    /// Candidates scoring below this on the artist signal are never winnable.
    pub artist_reject_floor: i32,
    /// Also strip "(Remastered 2009)"-style version tags during
    /// normalization. Off by default; the baseline strips feat./with only.
    pub strip_version_tags: bool,
    pub weights: ScoreWeights,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 30,
            relaxed_threshold: 15,
            relaxed_duration_floor: 20,
            artist_reject_floor: -30,
            strip_version_tags: false,
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub playlist_description: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            playlist_description: "Synced by trackbridge".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub source: CatalogConfig,
    pub destination: CatalogConfig,
    pub search: SearchConfig,
    pub matcher: MatcherConfig,
    pub sync: SyncConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: TRACKBRIDGE_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("TRACKBRIDGE_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
