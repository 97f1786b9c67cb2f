// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire representations for both catalogs, and their conversion into domain
//! types. All shape tolerance lives here: the rest of the workspace only
//! ever sees `CandidateTrack`, `SourceTrack`, and `Playlist`.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use trackbridge_domain::{CandidateId, CandidateTrack, Playlist, QualityTier, SourceTrack};

/// Track ids arrive as integers from some endpoints and strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Int(u64),
    Text(String),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireId::Int(id) => write!(f, "{}", id),
            WireId::Text(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAlbum {
    pub name: Option<String>,
}

/// A destination-catalog track as it appears in search results.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTrack {
    pub id: WireId,
    #[serde(default)]
    pub name: Option<String>,
    /// Some endpoints report only a display name including version tags.
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub artists: Vec<WireArtist>,
    #[serde(default)]
    pub album: Option<WireAlbum>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub is_hi_res_lossless: Option<bool>,
    #[serde(default)]
    pub is_lossless: Option<bool>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl WireTrack {
    /// Convert to a domain candidate. Entries with no usable title are
    /// dropped; they cannot be scored.
    pub fn into_candidate(self) -> Option<CandidateTrack> {
        let title = match (self.name, self.full_name) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(full_name)) if !full_name.is_empty() => full_name,
            _ => return None,
        };

        let available = self.available.unwrap_or(true);
        let quality = if !available {
            QualityTier::Lossy
        } else if self.is_hi_res_lossless.unwrap_or(false) {
            QualityTier::HiResLossless
        } else if self.is_lossless.unwrap_or(false) {
            QualityTier::Lossless
        } else {
            QualityTier::Lossy
        };

        Some(CandidateTrack {
            id: CandidateId::new(self.id.to_string()),
            title,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album: self.album.and_then(|a| a.name),
            duration_secs: self.duration,
            external_code: self.isrc,
            quality,
            popularity: self.popularity,
            release_date: self
                .release_date
                .as_deref()
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()),
        })
    }
}

/// Paged wrapper used by some search deployments.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePage {
    #[serde(default)]
    pub items: Vec<WireTrack>,
}

/// The search endpoint has been observed returning three shapes: a paged
/// object under "tracks", a flat "tracks" array, and a bare array. One
/// union here keeps every other module off that branch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponseBody {
    Paged { tracks: WirePage },
    Keyed { tracks: Vec<WireTrack> },
    Plain(Vec<WireTrack>),
}

impl SearchResponseBody {
    pub fn into_tracks(self) -> Vec<WireTrack> {
        match self {
            SearchResponseBody::Paged { tracks } => tracks.items,
            SearchResponseBody::Keyed { tracks } => tracks,
            SearchResponseBody::Plain(tracks) => tracks,
        }
    }
}

// ============================================================================
// Playlists (both catalogs)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WirePlaylist {
    pub id: WireId,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, alias = "number_of_tracks")]
    pub track_count: Option<u32>,
}

impl WirePlaylist {
    pub fn into_playlist(self) -> Playlist {
        Playlist {
            id: trackbridge_domain::PlaylistId::new(self.id.to_string()),
            title: self.title,
            track_count: self.track_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePlaylistPage {
    #[serde(default)]
    pub items: Vec<WirePlaylist>,
}

// ============================================================================
// Source catalog reads
// ============================================================================

/// A source-catalog track. Duration is milliseconds on this side of the
/// bridge; the recording code is nested under the external-ids map.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceWireTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<WireArtist>,
    #[serde(default)]
    pub album: Option<WireAlbum>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub external_ids: HashMap<String, String>,
}

impl SourceWireTrack {
    pub fn into_source_track(self) -> Option<SourceTrack> {
        let title = self.name.filter(|name| !name.is_empty())?;
        Some(SourceTrack {
            title,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album: self.album.and_then(|a| a.name),
            duration_ms: self.duration_ms,
            external_code: self.external_ids.get("isrc").cloned(),
        })
    }
}

/// Playlist and library items wrap the track under a "track" key; saved-track
/// feeds sometimes inline it. Tolerate both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SourceWireItem {
    Wrapped { track: SourceWireTrack },
    Inline(SourceWireTrack),
}

impl SourceWireItem {
    pub fn into_track(self) -> SourceWireTrack {
        match self {
            SourceWireItem::Wrapped { track } => track,
            SourceWireItem::Inline(track) => track,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceTrackPage {
    #[serde(default)]
    pub items: Vec<SourceWireItem>,
}
