//! Rendering of live responses.

use hogql_runner::query::{QueryExecutor, RefreshStrategy};
use hogql_runner::render::{render_html, render_table, RenderContext};
use serde_json::json;
use tempfile::tempdir;

use super::StubServer;

#[tokio::test]
async fn test_html_for_live_success() {
    let server = StubServer::json(json!({
        "columns": ["person", "props"],
        "results": [["<admin>", {"plan": "free"}], [null, []]],
        "hogql": "SELECT person, props FROM persons",
    }))
    .await;
    let workspace = tempdir().unwrap();
    let executor = QueryExecutor::connect(&server.sources(), Some(workspace.path())).unwrap();

    let response = executor
        .execute_query("SELECT person, props FROM persons", RefreshStrategy::Blocking)
        .await;
    let html = render_html(&response.result, &RenderContext::now());

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Showing 2 rows"));
    assert!(html.contains("<td>&lt;admin&gt;</td>"));
    assert!(html.contains("<td><em>NULL</em></td>"));
    assert!(html.contains("&quot;plan&quot;: &quot;free&quot;"));
}

#[tokio::test]
async fn test_html_and_table_for_live_failure() {
    let server = StubServer::start(500, json!({"error": "<boom>"}).to_string()).await;
    let workspace = tempdir().unwrap();
    let executor = QueryExecutor::connect(&server.sources(), Some(workspace.path())).unwrap();

    let response = executor
        .execute_query("SELECT 1", RefreshStrategy::Blocking)
        .await;

    let html = render_html(&response.result, &RenderContext::now());
    assert!(html.contains("<h2>Query Error</h2>"));
    assert!(html.contains("Error executing query: &lt;boom&gt;"));
    assert!(!html.contains("<table"));

    let table = render_table(&response);
    assert!(table.contains("Error executing query: <boom>"));
}
