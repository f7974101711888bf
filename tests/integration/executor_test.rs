//! End-to-end executor tests: credential resolution, file reading and HTTP.

use hogql_runner::error::ErrorKind;
use hogql_runner::query::{QueryExecutor, RefreshStrategy};
use serde_json::json;
use tempfile::tempdir;

use super::StubServer;

#[tokio::test]
async fn test_execute_file_through_stub() {
    let server = StubServer::json(json!({
        "columns": ["event", "count"],
        "results": [["$pageview", 10], ["signup", 2]],
    }))
    .await;
    let workspace = tempdir().unwrap();
    let file = workspace.path().join("top_events.sql");
    std::fs::write(
        &file,
        "-- top events\nSELECT event, count()\nFROM events\nGROUP BY event;\n",
    )
    .unwrap();

    let executor = QueryExecutor::connect(&server.sources(), Some(workspace.path())).unwrap();
    let response = executor
        .execute_query_from_file(&file, RefreshStrategy::Blocking)
        .await;

    assert!(response.is_success());
    assert_eq!(response.file_path.as_deref(), Some(file.as_path()));
    let success = response.result.as_success().unwrap();
    assert_eq!(success.row_count(), 2);
    assert_eq!(
        success.query_text,
        "SELECT event, count() FROM events GROUP BY event"
    );
    assert_eq!(
        response.status_messages()[1],
        "Fetched 2 rows."
    );

    let requests = server.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer phx_test_key"));
    assert_eq!(requests[0].project_id, "4242");
    assert_eq!(requests[0].body["refresh"], "blocking");
}

#[tokio::test]
async fn test_workspace_env_file_supplies_credentials() {
    let server = StubServer::json(json!({"columns": ["n"], "results": [[1]]})).await;
    let workspace = tempdir().unwrap();
    std::fs::write(
        workspace.path().join(".env"),
        "POSTHOG_API_KEY=phx_from_env_file\nPOSTHOG_PROJECT_ID=77\n",
    )
    .unwrap();

    let mut sources = server.sources();
    sources.override_api_key = None;
    sources.override_project_id = None;

    let executor = QueryExecutor::connect(&sources, Some(workspace.path())).unwrap();
    let response = executor
        .execute_query("SELECT 1 AS n", RefreshStrategy::ForceBlocking)
        .await;

    assert!(response.is_success());
    let requests = server.requests();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer phx_from_env_file")
    );
    assert_eq!(requests[0].project_id, "77");
}

#[tokio::test]
async fn test_empty_file_never_reaches_the_api() {
    let server = StubServer::json(json!({"columns": [], "results": []})).await;
    let workspace = tempdir().unwrap();
    let file = workspace.path().join("blank.sql");
    std::fs::write(&file, "\n   \n").unwrap();

    let executor = QueryExecutor::connect(&server.sources(), Some(workspace.path())).unwrap();
    let response = executor
        .execute_query_from_file(&file, RefreshStrategy::Blocking)
        .await;

    assert_eq!(
        response.result.as_failure().unwrap().kind,
        ErrorKind::EmptyQuery
    );
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn test_upstream_error_keeps_timing() {
    let server = StubServer::json(json!({"error": "Syntax error at line 1"})).await;
    let workspace = tempdir().unwrap();

    let executor = QueryExecutor::connect(&server.sources(), Some(workspace.path())).unwrap();
    let response = executor
        .execute_query("SELEC 1", RefreshStrategy::Blocking)
        .await;

    let failure = response.result.as_failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Upstream);
    assert_eq!(failure.message, "API Query Error: Syntax error at line 1");
    assert!(response.execution_time_secs >= 0.0);
    assert_eq!(server.hits(), 1);
}
