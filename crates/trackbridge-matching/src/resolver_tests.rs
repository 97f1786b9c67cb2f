// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::resolver::MatchResolver;
    use crate::strategy::{CandidateSearch, SearchOutcome};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use trackbridge_catalog::TrackSearch;
    use trackbridge_config::MatcherConfig;
    use trackbridge_domain::{CandidateId, CandidateTrack, MatchResult, QualityTier, SourceTrack};

    /// Returns the same pool for every query and records the queries issued.
    struct StaticSearch {
        results: Vec<CandidateTrack>,
        queries: Mutex<Vec<String>>,
    }

    impl StaticSearch {
        fn new(results: Vec<CandidateTrack>) -> Arc<Self> {
            Arc::new(Self {
                results,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TrackSearch for StaticSearch {
        async fn search(&self, query: &str, _limit: u32) -> Vec<CandidateTrack> {
            self.queries.lock().unwrap().push(query.to_string());
            self.results.clone()
        }
    }

    /// Maps specific queries to result sets; everything else comes up empty.
    struct QueryMapSearch {
        map: HashMap<String, Vec<CandidateTrack>>,
        queries: Mutex<Vec<String>>,
    }

    impl QueryMapSearch {
        fn new(map: HashMap<String, Vec<CandidateTrack>>) -> Arc<Self> {
            Arc::new(Self {
                map,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TrackSearch for QueryMapSearch {
        async fn search(&self, query: &str, _limit: u32) -> Vec<CandidateTrack> {
            self.queries.lock().unwrap().push(query.to_string());
            self.map.get(query).cloned().unwrap_or_default()
        }
    }

    fn resolver(search: Arc<dyn TrackSearch>) -> MatchResolver {
        MatchResolver::new(search, &MatcherConfig::default(), 10)
    }

    fn yesterday_source() -> SourceTrack {
        let mut source = SourceTrack::new("Yesterday", vec!["The Beatles".to_string()]);
        source.duration_ms = Some(125_000);
        source.album = Some("Help!".to_string());
        source
    }

    fn yesterday_candidate(id: &str) -> CandidateTrack {
        let mut candidate = CandidateTrack::new(id, "Yesterday", vec!["The Beatles".to_string()]);
        candidate.duration_secs = Some(126);
        candidate.quality = QualityTier::Lossless;
        candidate
    }

    #[tokio::test]
    async fn confident_match_resolves() {
        let search = StaticSearch::new(vec![yesterday_candidate("7001")]);
        let result = resolver(search).resolve_best_match(&yesterday_source()).await;

        match result {
            MatchResult::Matched(candidate) => assert_eq!(candidate.id, CandidateId::new("7001")),
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn exact_recording_code_short_circuits() {
        // Terrible metadata everywhere except the recording code.
        let mut junk = CandidateTrack::new("9999", "Completely Different", vec!["Nobody".into()]);
        junk.duration_secs = Some(30);
        junk.external_code = Some("gbaye0601498".to_string());

        let search = StaticSearch::new(vec![junk]);
        let mut source = yesterday_source();
        source.external_code = Some("GBAYE0601498".to_string());

        let result = resolver(search.clone()).resolve_best_match(&source).await;
        match result {
            MatchResult::Matched(candidate) => assert_eq!(candidate.id, CandidateId::new("9999")),
            MatchResult::NoMatch => panic!("expected the code match"),
        }
        // The short circuit skips every later pass.
        assert_eq!(search.queries(), vec!["isrc:GBAYE0601498".to_string()]);
    }

    #[tokio::test]
    async fn tribute_band_hard_rejected_even_when_alone() {
        let mut tribute = CandidateTrack::new(
            "666",
            "Yesterday (Live)",
            vec!["Across The Universe Tribute Band".to_string()],
        );
        tribute.duration_secs = Some(300);

        let search = StaticSearch::new(vec![tribute]);
        let result = resolver(search).resolve_best_match(&yesterday_source()).await;
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[tokio::test]
    async fn empty_pool_is_no_match() {
        let search = StaticSearch::new(Vec::new());
        let result = resolver(search).resolve_best_match(&yesterday_source()).await;
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[tokio::test]
    async fn ties_break_by_first_seen_order() {
        // Identical scores, different ids; the first-seen candidate wins,
        // and repeatedly.
        let first = yesterday_candidate("first");
        let second = yesterday_candidate("second");
        let search = StaticSearch::new(vec![first, second]);
        let resolver = resolver(search);

        for _ in 0..3 {
            match resolver.resolve_best_match(&yesterday_source()).await {
                MatchResult::Matched(candidate) => {
                    assert_eq!(candidate.id, CandidateId::new("first"))
                }
                MatchResult::NoMatch => panic!("expected a match"),
            }
        }
    }

    #[tokio::test]
    async fn higher_score_beats_insertion_order() {
        let mut live = yesterday_candidate("live");
        live.title = "Yesterday (Live at the BBC)".to_string();
        live.duration_secs = Some(180);
        let studio = yesterday_candidate("studio");

        let search = StaticSearch::new(vec![live, studio]);
        match resolver(search).resolve_best_match(&yesterday_source()).await {
            MatchResult::Matched(candidate) => assert_eq!(candidate.id, CandidateId::new("studio")),
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn exact_title_with_sparse_artists_accepted() {
        // title 50 + artist 0 (no candidate artists) + duration 20 + quality 0.
        let mut sparse = CandidateTrack::new("sparse", "Yesterday", vec![]);
        sparse.duration_secs = Some(129);

        let search = StaticSearch::new(vec![sparse]);
        match resolver(search).resolve_best_match(&yesterday_source()).await {
            MatchResult::Matched(candidate) => assert_eq!(candidate.id, CandidateId::new("sparse")),
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn near_miss_below_threshold_rejected() {
        // title 15 (2 of 5 tokens) + artist 10 + duration 0 = 25 < 30, and
        // the relaxed rule does not apply because the title is not exact.
        let mut source = SourceTrack::new(
            "one two three four five",
            vec!["Crosby Stills Nash".to_string()],
        );
        source.duration_ms = None;

        let candidate = CandidateTrack::new(
            "near",
            "one two nine eight seven",
            vec!["Nash Orchestra".to_string()],
        );

        let search = StaticSearch::new(vec![candidate]);
        let result = resolver(search).resolve_best_match(&source).await;
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[tokio::test]
    async fn search_passes_run_in_documented_order() {
        let mut source = SourceTrack::new(
            "Under Pressure",
            vec!["Queen".to_string(), "David Bowie".to_string()],
        );
        source.external_code = Some("GBUM71029604".to_string());
        source.album = Some("Hot Space".to_string());

        let search = StaticSearch::new(vec![yesterday_candidate("any")]);
        let strategy = CandidateSearch::new(search.clone(), 10);
        let _ = strategy.find_candidates(&source).await;

        assert_eq!(
            search.queries(),
            vec![
                "isrc:GBUM71029604".to_string(),
                "under pressure".to_string(),
                "under pressure Queen".to_string(),
                "under pressure David Bowie".to_string(),
                "under pressure Queen David Bowie".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn album_fallback_only_when_pool_empty() {
        let mut source = yesterday_source();
        source.external_code = None;

        // Nothing matches any query: the album fallback fires.
        let search = QueryMapSearch::new(HashMap::new());
        let strategy = CandidateSearch::new(search.clone(), 10);
        let outcome = strategy.find_candidates(&source).await;
        assert!(matches!(outcome, SearchOutcome::Candidates(pool) if pool.is_empty()));
        assert!(search
            .queries()
            .contains(&"yesterday help!".to_string()));

        // The title query already found something: no album query.
        let search = QueryMapSearch::new(HashMap::from([(
            "yesterday".to_string(),
            vec![yesterday_candidate("7001")],
        )]));
        let strategy = CandidateSearch::new(search.clone(), 10);
        let outcome = strategy.find_candidates(&source).await;
        assert!(matches!(outcome, SearchOutcome::Candidates(pool) if pool.len() == 1));
        assert!(!search
            .queries()
            .contains(&"yesterday help!".to_string()));
    }

    #[tokio::test]
    async fn pool_deduplicates_by_first_seen_id() {
        // Every pass returns the same two candidates; the pool holds each
        // id once, in first-seen order.
        let search = StaticSearch::new(vec![
            yesterday_candidate("a"),
            yesterday_candidate("b"),
        ]);
        let strategy = CandidateSearch::new(search, 10);
        let outcome = strategy.find_candidates(&yesterday_source()).await;

        match outcome {
            SearchOutcome::Candidates(pool) => {
                let ids: Vec<&str> = pool.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["a", "b"]);
            }
            SearchOutcome::Exact(_) => panic!("no code in play"),
        }
    }
}
