//! Integration tests for [`ApiClient`] against a mock HTTP server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scoutboard::api::{ApiClient, CollectionSource};
use scoutboard::{RetryConfig, ScoutboardError};

#[tokio::test]
async fn returns_named_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players/leaders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "players": [
                { "id": 8478402, "fullName": "Connor McDavid" },
                { "id": 8477934, "fullName": "Leon Draisaitl" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let players = client
        .fetch_collection("/players/leaders", "players")
        .await
        .unwrap();

    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["fullName"], "Connor McDavid");
}

#[tokio::test]
async fn passes_query_string_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nfl/schedule"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "games": [{ "id": 1 }] })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let games = client
        .fetch_collection("/nfl/schedule?season=2024", "games")
        .await
        .unwrap();
    assert_eq!(games.len(), 1);
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let err = client.fetch_collection("/teams", "teams").await.unwrap_err();

    assert_eq!(
        err,
        ScoutboardError::Api {
            status: 500,
            message: "database offline".into()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn too_many_requests_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let err = client.fetch_collection("/teams", "teams").await.unwrap_err();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn missing_collection_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/team-standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [] })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let err = client
        .fetch_collection("/team-standings", "standings")
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutboardError::Json(_)));
}

#[tokio::test]
async fn empty_collection_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/best-odds/back-to-back/today"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "best_odds_matchups_today": [] })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let picks = client
        .fetch_collection("/best-odds/back-to-back/today", "best_odds_matchups_today")
        .await
        .unwrap();
    assert!(picks.is_empty());
}

#[tokio::test]
async fn default_client_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    assert!(client.fetch_collection("/teams", "teams").await.is_err());
}

#[tokio::test]
async fn retrying_client_recovers_from_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [{ "abbrev": "EDM" }] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap().with_retry(
        RetryConfig::new()
            .max_attempts(3)
            .initial_delay(Duration::from_millis(10)),
    );
    let teams = client.fetch_collection("/teams", "teams").await.unwrap();
    assert_eq!(teams[0]["abbrev"], "EDM");
}

#[tokio::test]
async fn connection_refused_is_transient_http_error() {
    let client = ApiClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = client.fetch_collection("/teams", "teams").await.unwrap_err();
    assert!(matches!(err, ScoutboardError::Http(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[test]
fn rejects_non_http_base_url() {
    let err = ApiClient::new("localhost:8000").unwrap_err();
    assert!(matches!(err, ScoutboardError::Configuration(_)));
}
