// SPDX-License-Identifier: GPL-3.0-or-later

//! Cross-catalog track resolution engine.
//!
//! Given sparse, inconsistently formatted metadata for a source track, find
//! its best counterpart in the destination catalog's search index and decide
//! whether the match is confident enough to act on. Remote failures never
//! reach this crate's callers; the search layer absorbs them into smaller
//! candidate pools, and the resolver's only outcomes are `Matched` and
//! `NoMatch`.

pub mod normalize;
pub mod resolver;
#[cfg(test)]
mod resolver_tests;
pub mod scoring;
pub mod strategy;
pub mod sync;

pub use normalize::{normalize, normalize_with, token_set};
pub use resolver::MatchResolver;
pub use scoring::{ScoredCandidate, TrackScorer};
pub use strategy::{CandidateSearch, SearchOutcome};
pub use sync::{PlaylistSyncService, ProgressEvent, SyncReport};
