use crate::common::{http_executor, refused_url};
use std::time::Duration;
use urlq::fetcher::FailureKind;
use urlq::FetchOutcome;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_any_status_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let executor = http_executor(5);
    for (route, expected) in [("/ok", 200), ("/missing", 404), ("/broken", 503)] {
        let outcome = executor
            .execute(&format!("{}{}", mock_server.uri(), route))
            .await;
        match outcome {
            FetchOutcome::Success { http_code, .. } => assert_eq!(http_code, expected),
            other => panic!("Expected success for {}, got {:?}", route, other),
        }
    }
}

#[tokio::test]
async fn test_redirect_records_final_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = http_executor(5)
        .execute(&format!("{}/old", mock_server.uri()))
        .await;

    assert!(matches!(
        outcome,
        FetchOutcome::Success { http_code: 200, .. }
    ));
}

#[tokio::test]
async fn test_refused_connection_is_failure() {
    let outcome = http_executor(5).execute(&refused_url()).await;

    match outcome {
        FetchOutcome::Failure { kind, .. } => assert_eq!(kind, FailureKind::Connect),
        other => panic!("Expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let outcome = http_executor(1)
        .execute(&format!("{}/slow", mock_server.uri()))
        .await;

    match outcome {
        FetchOutcome::Failure { kind, .. } => assert_eq!(kind, FailureKind::Timeout),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_scheme_defaults_to_https() {
    let mock_server = MockServer::start().await;

    // A plain-HTTP server never sees a request sent over TLS
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let bare = mock_server.uri().trim_start_matches("http://").to_string();
    let outcome = http_executor(5).execute(&format!("{}/page", bare)).await;

    assert!(!outcome.is_success());
}
