//! Explorer driver tests against the stub query endpoint.

use hogql_runner::adapter::QueryOptions;
use hogql_runner::explorer::{ConnectionSettings, ExplorerDriver};
use serde_json::json;

use super::StubServer;

fn settings(server: &StubServer) -> ConnectionSettings {
    ConnectionSettings {
        id: "posthog-main".to_string(),
        api_key: Some("phx_test_key".to_string()),
        project_id: Some("4242".to_string()),
        api_url: Some(server.base_url.clone()),
    }
}

#[tokio::test]
async fn test_open_query_close() {
    let server = StubServer::json(json!({
        "columns": ["event", "n"],
        "results": [["$pageview", 3]],
    }))
    .await;
    let mut driver = ExplorerDriver::new(settings(&server));

    driver.open().await.unwrap();
    assert!(driver.is_open());
    assert_eq!(server.hits(), 1);
    assert_eq!(server.requests()[0].body["query"]["query"], "SELECT 1");
    assert_eq!(server.requests()[0].body["refresh"], "force_blocking");

    let options = QueryOptions {
        conn_id: Some("posthog-main".to_string()),
        request_id: Some("r1".to_string()),
    };
    let result = driver.show_records("events", 10, &options).await;

    assert!(!result.error);
    assert_eq!(result.query, "SELECT * FROM events LIMIT 10");
    assert_eq!(result.results[0]["event"], json!("$pageview"));
    assert_eq!(result.results[0]["n"], json!(3));

    driver.close();
    assert!(!driver.is_open());
}

#[tokio::test]
async fn test_open_fails_on_rejected_key() {
    let server = StubServer::start(403, json!({"detail": "Permission denied"}).to_string()).await;
    let mut driver = ExplorerDriver::new(settings(&server));

    let err = driver.open().await.unwrap_err();

    assert!(!driver.is_open());
    assert_eq!(
        err.to_string(),
        "Connection test failed: Error executing query: Permission denied"
    );
}

#[tokio::test]
async fn test_test_connection_does_not_open() {
    let server = StubServer::json(json!({"columns": ["1"], "results": [[1]]})).await;
    let driver = ExplorerDriver::new(settings(&server));

    driver.test_connection().await.unwrap();

    assert!(!driver.is_open());
    assert_eq!(server.hits(), 1);
}
