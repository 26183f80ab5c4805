use std::time::{Duration, Instant};

use citelaw_resolver::config::ApiConfig;
use citelaw_resolver::error::RemoteError;
use citelaw_resolver::http::RetryableFetcher;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(server.uri())
        .with_api_key("test-key")
        .with_max_attempts(3)
        .with_retry_delays(Duration::from_millis(1), Duration::from_millis(1))
}

#[tokio::test]
async fn test_success_sends_bearer_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "application/json"))
        .and(query_param("depth", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"key": "ca"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions", mock_server.uri());
    let body = fetcher.get(&url, &[("depth", "2".to_string())]).await.unwrap();

    assert_eq!(body[0]["key"], "ca");
}

#[tokio::test]
async fn test_three_429s_exhaust_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions", mock_server.uri());
    let err = fetcher.get(&url, &[]).await.unwrap_err();

    match err {
        RemoteError::RetriesExhausted { attempts, message } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("429"), "message: {message}");
        }
        other => panic!("Expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions", mock_server.uri());
    let body = fetcher.get(&url, &[]).await.unwrap();

    assert_eq!(body, serde_json::json!([]));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions/xx/laws"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown jurisdiction"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions/xx/laws", mock_server.uri());
    let err = fetcher.get(&url, &[]).await.unwrap_err();

    match err {
        RemoteError::Client { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "unknown jurisdiction");
        }
        other => panic!("Expected Client error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_after_raises_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions", mock_server.uri());

    let start = Instant::now();
    fetcher.get(&url, &[]).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jurisdictions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = RetryableFetcher::new(&fast_config(&mock_server)).unwrap();
    let url = format!("{}/jurisdictions", mock_server.uri());
    let err = fetcher.get(&url, &[]).await.unwrap_err();

    assert!(matches!(err, RemoteError::Decode { .. }));
}
