// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-signal scorers. Each is a pure, total function returning a bounded
//! integer contribution; higher is better. The weights are empirically tuned
//! and live in configuration so deployments can adjust them without edits.

use crate::normalize::normalize_with;
use std::collections::HashSet;
use trackbridge_config::{MatcherConfig, ScoreWeights};
use trackbridge_domain::{CandidateTrack, QualityTier, SourceTrack};

/// A candidate with its scores for one resolution call. The artist subscore
/// is kept separately to support hard-reject logic; nothing here outlives
/// the call.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: CandidateTrack,
    pub total_score: i32,
    pub artist_subscore: i32,
}

#[derive(Debug, Clone)]
pub struct TrackScorer {
    weights: ScoreWeights,
    strip_version_tags: bool,
}

impl TrackScorer {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            strip_version_tags: config.strip_version_tags,
        }
    }

    pub fn norm(&self, text: &str) -> String {
        normalize_with(text, self.strip_version_tags)
    }

    /// Artist token set. Articles carry no identity ("The Beatles" must not
    /// overlap "The Universe Tribute Band"), so they are excluded here.
    fn artist_tokens(&self, text: &str) -> HashSet<String> {
        const ARTICLES: [&str; 3] = ["the", "a", "an"];
        self.norm(text)
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty() && !ARTICLES.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Title similarity: exact normalized match, then token overlap measured
    /// against the source token count.
    pub fn title_score(&self, source_title: &str, candidate_title: &str) -> i32 {
        let source_norm = self.norm(source_title);
        let candidate_norm = self.norm(candidate_title);
        if source_norm.is_empty() || candidate_norm.is_empty() {
            return 0;
        }
        if source_norm == candidate_norm {
            return self.weights.title_exact;
        }

        let source_tokens: HashSet<&str> = source_norm.split_whitespace().collect();
        let candidate_tokens: HashSet<&str> = candidate_norm.split_whitespace().collect();
        if source_tokens.is_empty() {
            return 0;
        }
        let overlap = source_tokens.intersection(&candidate_tokens).count();
        let fraction = overlap as f64 / source_tokens.len() as f64;

        if fraction >= 0.6 {
            self.weights.title_strong_overlap
        } else if fraction >= 0.4 {
            self.weights.title_partial_overlap
        } else {
            0
        }
    }

    /// Artist overlap over the flattened, normalized artist credits. Zero
    /// overlap between non-empty sets is a strong negative signal.
    pub fn artist_score(&self, source_artists: &[String], candidate_artists: &[String]) -> i32 {
        let source_tokens = self.artist_tokens(&source_artists.join(" "));
        let candidate_tokens = self.artist_tokens(&candidate_artists.join(", "));

        if candidate_tokens.is_empty() || source_tokens.is_empty() {
            return 0;
        }

        let overlap = source_tokens.intersection(&candidate_tokens).count();
        if overlap == 0 {
            return self.weights.artist_disjoint;
        }

        let fraction = overlap as f64 / source_tokens.len() as f64;
        if fraction >= 0.66 {
            self.weights.artist_strong
        } else if fraction >= 0.4 {
            self.weights.artist_moderate
        } else {
            self.weights.artist_weak
        }
    }

    /// Duration closeness; source side is milliseconds, candidate seconds.
    pub fn duration_score(&self, source_ms: Option<u64>, candidate_secs: Option<u64>) -> i32 {
        let (Some(ms), Some(secs)) = (source_ms, candidate_secs) else {
            return 0;
        };
        let delta = (ms as f64 / 1000.0 - secs as f64).abs();

        if delta <= 2.0 {
            self.weights.duration_tight
        } else if delta <= 5.0 {
            self.weights.duration_close
        } else if delta <= 10.0 {
            self.weights.duration_loose
        } else {
            self.weights.duration_far
        }
    }

    /// Minor tiebreak on audio fidelity.
    pub fn quality_score(&self, candidate: &CandidateTrack) -> i32 {
        match candidate.quality {
            QualityTier::HiResLossless => self.weights.quality_hi_res,
            QualityTier::Lossless => self.weights.quality_lossless,
            QualityTier::Lossy => 0,
        }
    }

    pub fn score(&self, source: &SourceTrack, candidate: CandidateTrack) -> ScoredCandidate {
        let title = self.title_score(&source.title, &candidate.title);
        let artist = self.artist_score(&source.artists, &candidate.artists);
        let duration = self.duration_score(source.duration_ms, candidate.duration_secs);
        let quality = self.quality_score(&candidate);

        tracing::trace!(
            target: "matching",
            candidate = %candidate.id,
            title,
            artist,
            duration,
            quality,
            "candidate scored"
        );

        ScoredCandidate {
            candidate,
            total_score: title + artist + duration + quality,
            artist_subscore: artist,
        }
    }
}
