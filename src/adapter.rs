//! Result adaptation for downstream consumers.
//!
//! Reshapes the API's columnar results into row objects, attaches timing and
//! provenance, and builds the generic result record consumed by database
//! explorer tooling.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HogqlError, Result};
use crate::query::{QueryResult, QuerySuccess, Value};

/// One result row keyed by column name.
pub type TabularRow = serde_json::Map<String, Value>;

/// Pairs each column name with the value at the same position in every row.
///
/// A row whose length differs from the column count is a contract violation
/// and is reported as [`HogqlError::MalformedRow`] instead of being truncated
/// or padded.
pub fn to_row_objects(success: &QuerySuccess) -> Result<Vec<TabularRow>> {
    let expected = success.columns.len();

    success
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != expected {
                return Err(HogqlError::MalformedRow {
                    row: index,
                    expected,
                    actual: row.len(),
                });
            }
            Ok(success
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect())
        })
        .collect()
}

/// A query result with timing and provenance attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutorResponse {
    /// Classified query outcome.
    pub result: QueryResult,

    /// Wall-clock time of the round trip, in seconds.
    pub execution_time_secs: f64,

    /// Query file the text was read from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl ExecutorResponse {
    /// Returns true if the underlying result is a success.
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Returns the execution time as a duration.
    pub fn execution_time(&self) -> Duration {
        Duration::from_secs_f64(self.execution_time_secs)
    }

    /// Human-readable status lines (timing, row count or failure message).
    pub fn status_messages(&self) -> Vec<String> {
        let mut messages = vec![format!("Execution time: {:.3}s", self.execution_time_secs)];
        match &self.result {
            QueryResult::Success(success) => {
                messages.push(format!("Fetched {} rows.", success.row_count()));
            }
            QueryResult::Failure(failure) => messages.push(failure.message.clone()),
        }
        messages
    }
}

/// Attaches execution time and the originating file without changing the classification.
pub fn to_executor_response(
    result: QueryResult,
    execution_time: Duration,
    file_path: Option<PathBuf>,
) -> ExecutorResponse {
    let result = match result {
        QueryResult::Success(success) => {
            QueryResult::Success(success.with_execution_time(execution_time))
        }
        failure @ QueryResult::Failure(_) => failure,
    };

    ExecutorResponse {
        result,
        execution_time_secs: execution_time.as_secs_f64(),
        file_path,
    }
}

/// Identifiers supplied by an explorer for a single query call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Connection the call is addressed to.
    pub conn_id: Option<String>,

    /// Caller-chosen request identifier.
    pub request_id: Option<String>,
}

/// Generic tabular result for database explorer tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerResult {
    pub conn_id: String,
    pub request_id: String,
    pub result_id: String,
    pub query: String,
    pub cols: Vec<String>,
    pub results: Vec<TabularRow>,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_error: Option<String>,
    pub messages: Vec<String>,
}

impl ExplorerResult {
    /// Creates an empty, successful result for the given query.
    pub fn new(conn_id: &str, query: impl Into<String>, options: &QueryOptions) -> Self {
        let request_id = options.request_id.clone().unwrap_or_default();
        let result_id = options
            .request_id
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());

        Self {
            conn_id: conn_id.to_string(),
            request_id,
            result_id,
            query: query.into(),
            cols: Vec::new(),
            results: Vec::new(),
            error: false,
            raw_error: None,
            messages: Vec::new(),
        }
    }

    /// Creates an error result carrying `message` as both error and status line.
    pub fn failed(
        conn_id: &str,
        query: impl Into<String>,
        options: &QueryOptions,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let mut result = Self::new(conn_id, query, options);
        result.error = true;
        result.raw_error = Some(message.clone());
        result.messages.push(message);
        result
    }
}

/// Converts an executor response into an explorer result.
pub fn to_explorer_result(
    response: &ExecutorResponse,
    conn_id: &str,
    query: &str,
    options: &QueryOptions,
) -> ExplorerResult {
    let mut explorer = ExplorerResult::new(conn_id, query, options);
    explorer.messages.push(format!(
        "Execution time: {:.3}s",
        response.execution_time_secs
    ));

    match &response.result {
        QueryResult::Success(success) => {
            explorer.cols = success.columns.clone();
            match to_row_objects(success) {
                Ok(rows) => {
                    explorer
                        .messages
                        .push(format!("Fetched {} rows.", rows.len()));
                    explorer.results = rows;
                }
                Err(e) => {
                    explorer.error = true;
                    explorer.raw_error = Some(e.to_string());
                    explorer.messages.push(e.to_string());
                }
            }
        }
        QueryResult::Failure(failure) => {
            explorer.error = true;
            explorer.raw_error = Some(failure.message.clone());
            explorer.messages.push(failure.message.clone());
        }
    }

    explorer
}
