//! HTTP client integration tests against the stub query endpoint.

use hogql_runner::client::{PostHogClient, QueryClient};
use hogql_runner::credentials::{normalize_base_url, Credentials};
use hogql_runner::error::ErrorKind;
use hogql_runner::query::{QueryRequest, QueryResult, RefreshStrategy};
use serde_json::json;

use super::StubServer;

fn client_for(server: &StubServer) -> PostHogClient {
    let base_url = normalize_base_url(Some(&server.base_url)).unwrap();
    PostHogClient::new(Credentials::new("phx_test_key", "4242", base_url)).unwrap()
}

#[tokio::test]
async fn test_success_response() {
    let server = StubServer::json(json!({
        "columns": ["n", "s"],
        "results": [[1, "a"]],
        "hogql": "SELECT 1 AS n, 'a' AS s",
    }))
    .await;
    let client = client_for(&server);

    let result = client
        .execute(&QueryRequest::new(
            "SELECT 1 AS n, 'a' AS s; -- check\n",
            RefreshStrategy::ForceBlocking,
        ))
        .await;

    let success = result.as_success().expect("expected success");
    assert_eq!(success.columns, vec!["n", "s"]);
    assert_eq!(success.rows, vec![vec![json!(1), json!("a")]]);
    assert_eq!(success.query_text, "SELECT 1 AS n, 'a' AS s");
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_request_shape() {
    let server = StubServer::json(json!({"columns": [], "results": []})).await;
    let client = client_for(&server);

    client
        .execute(&QueryRequest::new(
            "/* top */ SELECT event\nFROM events -- all\nLIMIT 5;",
            RefreshStrategy::Async,
        ))
        .await;

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].project_id, "4242");
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer phx_test_key")
    );
    assert_eq!(
        requests[0].body,
        json!({
            "query": {"kind": "HogQLQuery", "query": "SELECT event FROM events LIMIT 5"},
            "refresh": "async",
        })
    );
}

#[tokio::test]
async fn test_embedded_error_with_200_status() {
    let server = StubServer::json(json!({
        "error": true,
        "detail": "Unknown table 'evnts'",
    }))
    .await;
    let client = client_for(&server);

    let result = client
        .execute(&QueryRequest::new("SELECT * FROM evnts", RefreshStrategy::Blocking))
        .await;

    let failure = result.as_failure().expect("expected failure");
    assert_eq!(failure.kind, ErrorKind::Upstream);
    assert_eq!(failure.message, "API Query Error: Unknown table 'evnts'");
    assert_eq!(
        failure.raw_response,
        Some(json!({"error": true, "detail": "Unknown table 'evnts'"}))
    );
}

#[tokio::test]
async fn test_non_2xx_with_detail() {
    let server = StubServer::start(401, json!({"detail": "Invalid API key"}).to_string()).await;
    let client = client_for(&server);

    let result = client
        .execute(&QueryRequest::new("SELECT 1", RefreshStrategy::Blocking))
        .await;

    let failure = result.as_failure().expect("expected failure");
    assert_eq!(failure.kind, ErrorKind::Transport);
    assert_eq!(failure.message, "Error executing query: Invalid API key");
}

#[tokio::test]
async fn test_non_2xx_without_body() {
    let server = StubServer::start(502, "<html>bad gateway</html>").await;
    let client = client_for(&server);

    let result = client
        .execute(&QueryRequest::new("SELECT 1", RefreshStrategy::Blocking))
        .await;

    assert_eq!(
        result.as_failure().unwrap().message,
        "Request Error: Request failed with status code 502"
    );
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let server = StubServer::json(json!({"columns": [], "results": []})).await;
    let client = client_for(&server);

    let result = client
        .execute(&QueryRequest::new(
            "-- nothing to see\n/* here */  ;",
            RefreshStrategy::Blocking,
        ))
        .await;

    assert!(matches!(result, QueryResult::Failure(ref f) if f.kind == ErrorKind::EmptyQuery));
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let client = PostHogClient::new(Credentials::new(
        "phx_test_key",
        "4242",
        "http://127.0.0.1:9/api",
    ))
    .unwrap();

    let result = client
        .execute(&QueryRequest::new("SELECT 1", RefreshStrategy::Blocking))
        .await;

    let failure = result.as_failure().expect("expected failure");
    assert_eq!(failure.kind, ErrorKind::Transport);
    assert!(failure.message.starts_with("Request Error:"));
}
