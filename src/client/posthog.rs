//! PostHog HogQL query client.
//!
//! Issues one authenticated `POST {base}/projects/{id}/query` per call and
//! classifies the response. No retries and no client-side timeout.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::QueryClient;
use crate::credentials::Credentials;
use crate::error::{HogqlError, Result};
use crate::query::{
    QueryFailure, QueryRequest, QueryResult, QuerySuccess, RefreshStrategy, Row, Value,
};

/// Browser-like user agent; some PostHog deployments reject bare clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Query kind understood by the query endpoint.
const HOGQL_QUERY_KIND: &str = "HogQLQuery";

/// PostHog query API client.
#[derive(Debug, Clone)]
pub struct PostHogClient {
    credentials: Credentials,
    client: Client,
}

impl PostHogClient {
    /// Creates a new client with the given credentials.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HogqlError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            client,
        })
    }

    /// Returns the credentials this client was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the query endpoint URL.
    fn query_url(&self) -> String {
        format!(
            "{}/projects/{}/query",
            self.credentials.base_url(),
            self.credentials.project_id()
        )
    }
}

#[async_trait]
impl QueryClient for PostHogClient {
    async fn execute(&self, request: &QueryRequest) -> QueryResult {
        let query = request.normalized_text();
        if query.is_empty() {
            return QueryResult::failure(HogqlError::empty_query(
                "Query is empty after removing comments and whitespace",
            ));
        }

        let payload = QueryPayload {
            query: HogqlQuery {
                kind: HOGQL_QUERY_KIND,
                query: &query,
            },
            refresh: request.refresh(),
        };

        debug!(
            "POST {} (refresh: {})",
            self.query_url(),
            request.refresh()
        );

        let response = match self
            .client
            .post(self.query_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key()),
            )
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Query request failed: {}", e);
                return QueryResult::failure(HogqlError::transport(format!(
                    "Request Error: {}",
                    e
                )));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return QueryResult::failure(HogqlError::transport(format!(
                    "Request Error: failed to read response: {}",
                    e
                )))
            }
        };

        debug!("Query response: {} ({} bytes)", status, body.len());
        classify_response(status, &body, &query)
    }
}

/// Request body for the query endpoint.
#[derive(Debug, Serialize)]
struct QueryPayload<'a> {
    query: HogqlQuery<'a>,
    refresh: RefreshStrategy,
}

#[derive(Debug, Serialize)]
struct HogqlQuery<'a> {
    kind: &'static str,
    query: &'a str,
}

/// Shape of a successful response body.
#[derive(Debug, Deserialize)]
struct SuccessBody {
    results: Option<Vec<Row>>,
    columns: Option<Vec<String>>,
    hogql: Option<Value>,
    query: Option<Value>,
}

/// Classifies an HTTP response into a [`QueryResult`].
///
/// Checks run in order: non-2xx status, unparseable body, embedded `error`
/// field, success shape.
pub(crate) fn classify_response(status: StatusCode, body: &str, submitted: &str) -> QueryResult {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let message = match parsed.as_ref().and_then(error_message_from_body) {
            Some(detail) => format!("Error executing query: {}", detail),
            None => format!(
                "Request Error: Request failed with status code {}",
                status.as_u16()
            ),
        };
        return QueryResult::failure(HogqlError::transport(message));
    }

    let Some(body) = parsed else {
        return QueryResult::failure(HogqlError::invalid_response(
            "response body is not valid JSON",
        ));
    };

    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let detail = non_empty_str(body.get("detail"))
            .map(String::from)
            .unwrap_or_else(|| stringify(error));
        let failure = QueryFailure::from(HogqlError::upstream(format!(
            "API Query Error: {}",
            detail
        )))
        .with_raw_response(body.clone());
        return QueryResult::Failure(failure);
    }

    match serde_json::from_value::<SuccessBody>(body) {
        Ok(success) => {
            let query_text = non_empty_str(success.hogql.as_ref())
                .or_else(|| non_empty_str(success.query.as_ref()))
                .unwrap_or(submitted)
                .to_string();
            QueryResult::Success(QuerySuccess::new(
                success.columns.unwrap_or_default(),
                success.results.unwrap_or_default(),
                query_text,
            ))
        }
        Err(e) => QueryResult::failure(HogqlError::invalid_response(format!(
            "unexpected response shape: {}",
            e
        ))),
    }
}

/// Extracts `detail`, else `error`, from an error body.
fn error_message_from_body(body: &Value) -> Option<String> {
    if let Some(detail) = non_empty_str(body.get("detail")) {
        return Some(detail.to_string());
    }
    match body.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(stringify(other)),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
