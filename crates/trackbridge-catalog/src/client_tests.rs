// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{
        DestinationClient, PlaylistWriter, RateLimiter, RetryPolicy, SourceClient, TrackSearch,
    };
    use std::time::Duration;
    use tokio::time::Instant;
    use trackbridge_domain::{CandidateId, PlaylistId, QualityTier};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(server: &MockServer) -> DestinationClient {
        DestinationClient::builder()
            .base_url(server.uri())
            .rate_limiter(RateLimiter::new(5, Duration::ZERO))
            .retry(RetryPolicy {
                max_retries: 4,
                initial_backoff: Duration::from_millis(20),
                max_backoff: Duration::from_millis(200),
                jitter: Duration::ZERO,
            })
            .build()
            .expect("client builds")
    }

    fn search_response() -> serde_json::Value {
        serde_json::json!({
            "tracks": [{
                "id": 7001,
                "name": "Yesterday",
                "artists": [{"name": "The Beatles"}],
                "album": {"name": "Help!"},
                "duration": 126,
                "isrc": "GBAYE0601498",
                "is_lossless": true,
                "available": true,
                "popularity": 88,
                "release_date": "1965-08-06"
            }]
        })
    }

    #[tokio::test]
    async fn search_parses_keyed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .and(query_param("query", "yesterday"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let tracks = client.search_tracks("yesterday", 10).await.unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, CandidateId::new("7001"));
        assert_eq!(tracks[0].title, "Yesterday");
        assert_eq!(tracks[0].quality, QualityTier::Lossless);
        assert_eq!(tracks[0].duration_secs, Some(126));
        assert_eq!(tracks[0].external_code.as_deref(), Some("GBAYE0601498"));
    }

    #[tokio::test]
    async fn throttled_search_retries_with_backoff_floor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let start = Instant::now();
        let tracks = client.search_tracks("yesterday", 10).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(tracks.len(), 1);
        // Two throttled attempts: 20ms + 40ms cumulative backoff at minimum.
        assert!(
            elapsed >= Duration::from_millis(60),
            "expected >= 60ms of backoff, got {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn throttling_wording_in_error_body_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string("upstream rate limit exceeded"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let tracks = client.search_tracks("yesterday", 10).await.unwrap();
        assert_eq!(tracks.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let tracks = TrackSearch::search(&client, "yesterday", 10).await;
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn non_throttling_failure_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tracks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let tracks = TrackSearch::search(&client, "yesterday", 10).await;
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn get_or_create_reuses_existing_playlist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "pl-1", "title": "Road Trip", "track_count": 12}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let playlist = client
            .get_or_create_playlist("road trip", "Synced by trackbridge")
            .await
            .unwrap();
        assert_eq!(playlist.id, PlaylistId::new("pl-1"));
    }

    #[tokio::test]
    async fn missing_playlist_is_created() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/me/playlists"))
            .and(body_json(serde_json::json!({
                "title": "Road Trip",
                "description": "Synced by trackbridge"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pl-2", "title": "Road Trip"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server);
        let playlist = client
            .get_or_create_playlist("Road Trip", "Synced by trackbridge")
            .await
            .unwrap();
        assert_eq!(playlist.id, PlaylistId::new("pl-2"));
    }

    #[tokio::test]
    async fn favorites_write_posts_track_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/favorites/tracks"))
            .and(body_json(serde_json::json!({"track_ids": ["7001", "7002"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server);
        client
            .add_favorite_tracks(&[CandidateId::new("7001"), CandidateId::new("7002")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn source_reader_follows_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/tracks"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"track": {"name": "Yesterday", "artists": [{"name": "The Beatles"}],
                               "duration_ms": 125000,
                               "external_ids": {"isrc": "GBAYE0601498"}}},
                    {"track": {"name": "Help!", "artists": [{"name": "The Beatles"}],
                               "duration_ms": 139000, "external_ids": {}}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/tracks"))
            .and(query_param("offset", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let client = SourceClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let tracks = client.saved_tracks().await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "Yesterday");
        assert_eq!(tracks[0].external_code.as_deref(), Some("GBAYE0601498"));
        assert_eq!(tracks[1].external_code, None);
    }
}
