// SPDX-License-Identifier: GPL-3.0-or-later

//! Combines the candidate search with the scorers to pick one best match or
//! declare no match. A single linear pipeline per call; no state survives
//! between calls.

use crate::scoring::{ScoredCandidate, TrackScorer};
use crate::strategy::{CandidateSearch, SearchOutcome};
use std::sync::Arc;
use tracing::debug;
use trackbridge_catalog::TrackSearch;
use trackbridge_config::{MatcherConfig, SearchConfig};
use trackbridge_domain::{MatchResult, SourceTrack};

pub struct MatchResolver {
    strategy: CandidateSearch,
    scorer: TrackScorer,
    accept_threshold: i32,
    relaxed_threshold: i32,
    relaxed_duration_floor: i32,
    artist_reject_floor: i32,
}

impl MatchResolver {
    pub fn new(search: Arc<dyn TrackSearch>, matcher: &MatcherConfig, limit: u32) -> Self {
        Self {
            strategy: CandidateSearch::new(search, limit),
            scorer: TrackScorer::new(matcher),
            accept_threshold: matcher.accept_threshold,
            relaxed_threshold: matcher.relaxed_threshold,
            relaxed_duration_floor: matcher.relaxed_duration_floor,
            artist_reject_floor: matcher.artist_reject_floor,
        }
    }

    pub fn from_config(
        search: Arc<dyn TrackSearch>,
        matcher: &MatcherConfig,
        search_config: &SearchConfig,
    ) -> Self {
        Self::new(search, matcher, search_config.limit)
    }

    /// Resolve the source track to its best destination counterpart.
    ///
    /// Remote failures have already been absorbed into smaller candidate
    /// pools by the search layer; the only outcomes here are a confident
    /// match or none.
    pub async fn resolve_best_match(&self, source: &SourceTrack) -> MatchResult {
        let pool = match self.strategy.find_candidates(source).await {
            SearchOutcome::Exact(candidate) => return MatchResult::Matched(candidate),
            SearchOutcome::Candidates(pool) => pool,
        };

        if pool.is_empty() {
            debug!(target: "matching", title = %source.title, "no candidates found");
            return MatchResult::NoMatch;
        }

        let mut winner: Option<ScoredCandidate> = None;
        for candidate in pool {
            let scored = self.scorer.score(source, candidate);

            // Confidently wrong artist: never winnable, whatever the rest
            // of the signals say.
            if scored.artist_subscore < self.artist_reject_floor {
                debug!(
                    target: "matching",
                    candidate = %scored.candidate.id,
                    artist_subscore = scored.artist_subscore,
                    "candidate hard-rejected on artist signal"
                );
                continue;
            }

            // Strict comparison keeps the first-seen candidate on ties.
            match &winner {
                Some(best) if scored.total_score <= best.total_score => {}
                _ => winner = Some(scored),
            }
        }

        let Some(winner) = winner else {
            debug!(target: "matching", title = %source.title, "all candidates hard-rejected");
            return MatchResult::NoMatch;
        };

        let threshold = if self.relaxed_threshold_applies(source, &winner) {
            self.relaxed_threshold
        } else {
            self.accept_threshold
        };

        if winner.total_score < threshold {
            debug!(
                target: "matching",
                title = %source.title,
                score = winner.total_score,
                threshold,
                "winning candidate below threshold"
            );
            return MatchResult::NoMatch;
        }

        debug!(
            target: "matching",
            title = %source.title,
            candidate = %winner.candidate.id,
            score = winner.total_score,
            "match resolved"
        );
        MatchResult::Matched(winner.candidate)
    }

    /// The lowered threshold rescues matches whose only weakness is sparse
    /// or differently formatted artist metadata: exact normalized title and
    /// duration within five seconds.
    fn relaxed_threshold_applies(&self, source: &SourceTrack, winner: &ScoredCandidate) -> bool {
        let source_title = self.scorer.norm(&source.title);
        if source_title.is_empty() || source_title != self.scorer.norm(&winner.candidate.title) {
            return false;
        }
        let duration =
            self.scorer
                .duration_score(source.duration_ms, winner.candidate.duration_secs);
        duration >= self.relaxed_duration_floor
    }
}
