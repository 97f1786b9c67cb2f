// SPDX-License-Identifier: GPL-3.0-or-later

//! Progressively broader candidate lookups against the destination search
//! index. Passes accumulate into one pool deduplicated by id (first seen
//! wins); they are unioned rather than short-circuited so the scorer sees
//! the widest possible pool. The lone exception is an exact recording-code
//! hit, which ends the whole resolution on the spot.

use crate::normalize::normalize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};
use trackbridge_catalog::TrackSearch;
use trackbridge_domain::{CandidateId, CandidateTrack, SourceTrack};

/// Result of the search phase.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A recording-code match from the first pass; definitionally correct,
    /// scoring is skipped entirely.
    Exact(CandidateTrack),
    /// The accumulated, deduplicated candidate pool in first-seen order.
    Candidates(Vec<CandidateTrack>),
}

pub struct CandidateSearch {
    search: Arc<dyn TrackSearch>,
    limit: u32,
}

impl CandidateSearch {
    pub fn new(search: Arc<dyn TrackSearch>, limit: u32) -> Self {
        Self { search, limit }
    }

    pub async fn find_candidates(&self, source: &SourceTrack) -> SearchOutcome {
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let mut pool: Vec<CandidateTrack> = Vec::new();

        // Pass 1: fielded recording-code query.
        if let Some(code) = source.external_code.as_deref().filter(|c| !c.is_empty()) {
            let results = self.search.search(&format!("isrc:{}", code), self.limit).await;
            for candidate in &results {
                if candidate
                    .external_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
                {
                    debug!(
                        target: "matching",
                        candidate = %candidate.id,
                        code,
                        "exact recording-code match"
                    );
                    return SearchOutcome::Exact(candidate.clone());
                }
            }
            Self::fold(&mut seen, &mut pool, results);
        }

        // Pass 2: normalized title alone.
        let title = normalize(&source.title);
        if !title.is_empty() {
            let results = self.search.search(&title, self.limit).await;
            Self::fold(&mut seen, &mut pool, results);
        }

        // Pass 3: title combined with each artist, then with all artists
        // joined when there is more than one. Per-artist queries tolerate
        // catalogs that index only the primary artist.
        if !source.artists.is_empty() {
            for artist in &source.artists {
                let query = format!("{} {}", title, artist);
                let results = self.search.search(&query, self.limit).await;
                Self::fold(&mut seen, &mut pool, results);
            }
            if source.artists.len() > 1 {
                let query = format!("{} {}", title, source.artists.join(" "));
                let results = self.search.search(&query, self.limit).await;
                Self::fold(&mut seen, &mut pool, results);
            }
        }

        // Pass 4: album fallback, only when everything above came up empty.
        if pool.is_empty() {
            if let Some(album) = source.album.as_deref() {
                let album_norm = normalize(album);
                if !album_norm.is_empty() {
                    let query = format!("{} {}", title, album_norm);
                    let results = self.search.search(&query, self.limit).await;
                    Self::fold(&mut seen, &mut pool, results);
                }
            }
        }

        trace!(target: "matching", pool = pool.len(), "candidate search complete");
        SearchOutcome::Candidates(pool)
    }

    fn fold(
        seen: &mut HashSet<CandidateId>,
        pool: &mut Vec<CandidateTrack>,
        results: Vec<CandidateTrack>,
    ) {
        for candidate in results {
            if seen.insert(candidate.id.clone()) {
                pool.push(candidate);
            }
        }
    }
}
