// SPDX-License-Identifier: GPL-3.0-or-later

//! Orchestrates one sync run: resolve every source track, then write the
//! matched ids to the destination playlist or favorites. Unmatched tracks
//! are counted and reported, never silently dropped.

use crate::resolver::MatchResolver;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use trackbridge_catalog::{PlaylistWriter, Result as CatalogResult};
use trackbridge_domain::{CandidateId, MatchResult, SourceTrack};

/// Progress notifications for one sync run. Consumers receive these over an
/// explicit channel; a full or dropped receiver never stalls the sync.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { title: String, total: usize },
    TrackResolved { index: usize, total: usize, matched: bool },
    Finished { title: String, report: SyncReport },
}

/// Tally of one sync target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub matched_ids: Vec<CandidateId>,
}

pub struct PlaylistSyncService {
    resolver: MatchResolver,
    writer: Arc<dyn PlaylistWriter>,
    playlist_description: String,
}

impl PlaylistSyncService {
    pub fn new(
        resolver: MatchResolver,
        writer: Arc<dyn PlaylistWriter>,
        playlist_description: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            writer,
            playlist_description: playlist_description.into(),
        }
    }

    /// Resolve every track, emitting a progress event per item.
    pub async fn resolve_tracks(
        &self,
        title: &str,
        tracks: &[SourceTrack],
        progress: Option<&mpsc::Sender<ProgressEvent>>,
    ) -> SyncReport {
        let total = tracks.len();
        Self::emit(
            progress,
            ProgressEvent::Started {
                title: title.to_string(),
                total,
            },
        );

        let mut report = SyncReport {
            total,
            ..SyncReport::default()
        };

        for (index, track) in tracks.iter().enumerate() {
            let matched = match self.resolver.resolve_best_match(track).await {
                MatchResult::Matched(candidate) => {
                    report.matched_ids.push(candidate.id);
                    report.matched += 1;
                    true
                }
                MatchResult::NoMatch => {
                    debug!(target: "sync", title = %track.title, "track unmatched");
                    report.unmatched += 1;
                    false
                }
            };
            Self::emit(
                progress,
                ProgressEvent::TrackResolved {
                    index,
                    total,
                    matched,
                },
            );
        }

        info!(
            target: "sync",
            title,
            matched = report.matched,
            unmatched = report.unmatched,
            "resolution complete"
        );
        Self::emit(
            progress,
            ProgressEvent::Finished {
                title: title.to_string(),
                report: report.clone(),
            },
        );
        report
    }

    /// Sync one playlist: resolve its tracks, then get-or-create the
    /// destination playlist and add the matched ids. `dry_run` skips all
    /// destination writes.
    pub async fn sync_playlist(
        &self,
        title: &str,
        tracks: &[SourceTrack],
        dry_run: bool,
        progress: Option<&mpsc::Sender<ProgressEvent>>,
    ) -> CatalogResult<SyncReport> {
        let report = self.resolve_tracks(title, tracks, progress).await;

        if dry_run {
            info!(target: "sync", title, "dry run: skipping playlist writes");
            return Ok(report);
        }
        if report.matched_ids.is_empty() {
            warn!(target: "sync", title, "no matches to add");
            return Ok(report);
        }

        let playlist = self
            .writer
            .get_or_create_playlist(title, &self.playlist_description)
            .await?;
        self.writer
            .add_playlist_tracks(&playlist.id, &report.matched_ids)
            .await?;
        info!(
            target: "sync",
            title,
            playlist = %playlist.id,
            added = report.matched_ids.len(),
            "playlist synced"
        );
        Ok(report)
    }

    /// Sync the saved-tracks library into destination favorites.
    pub async fn sync_favorites(
        &self,
        tracks: &[SourceTrack],
        dry_run: bool,
        progress: Option<&mpsc::Sender<ProgressEvent>>,
    ) -> CatalogResult<SyncReport> {
        let report = self.resolve_tracks("Saved Tracks", tracks, progress).await;

        if dry_run {
            info!(target: "sync", "dry run: skipping favorites writes");
            return Ok(report);
        }
        if report.matched_ids.is_empty() {
            warn!(target: "sync", "no matches to add to favorites");
            return Ok(report);
        }

        self.writer.add_favorite_tracks(&report.matched_ids).await?;
        info!(
            target: "sync",
            added = report.matched_ids.len(),
            "favorites synced"
        );
        Ok(report)
    }

    fn emit(progress: Option<&mpsc::Sender<ProgressEvent>>, event: ProgressEvent) {
        if let Some(sender) = progress {
            // try_send: progress is best-effort, the sync never waits on it.
            let _ = sender.try_send(event);
        }
    }
}
