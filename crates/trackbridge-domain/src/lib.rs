// SPDX-License-Identifier: GPL-3.0-or-later

//! Core value types shared across the trackbridge workspace.
//!
//! Source tracks come from the catalog being read, candidate tracks from the
//! catalog being written to. Neither carries any identity or state beyond
//! what the remote services report; everything here is a plain value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque track identifier within the destination catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque playlist identifier, valid within whichever catalog issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tracks
// ============================================================================

/// A track as read from the source catalog. Constructed per resolution call
/// and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub title: String,
    /// Credit order is preserved; the first entry is the primary artist.
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
    /// Industry recording code (e.g. ISRC), the highest-confidence match key.
    pub external_code: Option<String>,
}

impl SourceTrack {
    pub fn new(title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            title: title.into(),
            artists,
            album: None,
            duration_ms: None,
            external_code: None,
        }
    }
}

/// Coarse audio fidelity ranking reported by the destination catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityTier {
    HiResLossless,
    Lossless,
    /// Lossy, or the track is not currently streamable.
    Lossy,
}

/// A track from the destination catalog's search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub id: CandidateId,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_secs: Option<u64>,
    pub external_code: Option<String>,
    pub quality: QualityTier,
    pub popularity: Option<u32>,
    pub release_date: Option<NaiveDate>,
}

impl CandidateTrack {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            id: CandidateId::new(id),
            title: title.into(),
            artists,
            album: None,
            duration_secs: None,
            external_code: None,
            quality: QualityTier::Lossy,
            popularity: None,
            release_date: None,
        }
    }
}

/// Outcome of one resolution call. The engine always commits to one of the
/// two variants; there is no partial or ambiguous state.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched(CandidateTrack),
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn into_candidate(self) -> Option<CandidateTrack> {
        match self {
            MatchResult::Matched(candidate) => Some(candidate),
            MatchResult::NoMatch => None,
        }
    }
}

// ============================================================================
// Playlists
// ============================================================================

/// A playlist summary, as listed by either catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub title: String,
    #[serde(default)]
    pub track_count: Option<u32>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::new(id),
            title: title.into(),
            track_count: None,
        }
    }
}
