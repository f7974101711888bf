//! Query request and result types.
//!
//! Defines the structures exchanged between the executor, the API client,
//! the adapters and the renderers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ErrorKind, HogqlError};
use crate::query::normalizer::normalize_query;

/// A single cell value as returned by the API.
pub type Value = serde_json::Value;

/// A row of positional values.
pub type Row = Vec<Value>;

/// Server-side cache/recompute policy sent with every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStrategy {
    /// Return cached data or a cache miss; always completes immediately.
    ForceCache,
    /// Calculate synchronously, unless there are very fresh results in the cache.
    Blocking,
    /// Kick off background calculation, unless there are very fresh results in the cache.
    Async,
    /// Kick off background calculation, unless there are somewhat fresh results in the cache.
    LazyAsync,
    /// Calculate synchronously, even if fresh results are already cached.
    #[default]
    ForceBlocking,
    /// Kick off background calculation, even if fresh results are already cached.
    ForceAsync,
}

impl RefreshStrategy {
    /// Default strategy for queries triggered from a file or an inline query.
    pub const HOST_DEFAULT: RefreshStrategy = RefreshStrategy::Blocking;

    /// Returns the wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForceCache => "force_cache",
            Self::Blocking => "blocking",
            Self::Async => "async",
            Self::LazyAsync => "lazy_async",
            Self::ForceBlocking => "force_blocking",
            Self::ForceAsync => "force_async",
        }
    }
}

impl FromStr for RefreshStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "force_cache" => Ok(Self::ForceCache),
            "blocking" => Ok(Self::Blocking),
            "async" => Ok(Self::Async),
            "lazy_async" => Ok(Self::LazyAsync),
            "force_blocking" => Ok(Self::ForceBlocking),
            "force_async" => Ok(Self::ForceAsync),
            _ => Err(format!(
                "Invalid refresh strategy: {s}. Expected one of: force_cache, blocking, async, \
                 lazy_async, force_blocking, force_async"
            )),
        }
    }
}

impl fmt::Display for RefreshStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query to submit, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    raw_text: String,
    refresh: RefreshStrategy,
}

impl QueryRequest {
    /// Creates a request for the given raw query text.
    pub fn new(raw_text: impl Into<String>, refresh: RefreshStrategy) -> Self {
        Self {
            raw_text: raw_text.into(),
            refresh,
        }
    }

    /// The query text exactly as supplied by the caller.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The refresh strategy to send.
    pub fn refresh(&self) -> RefreshStrategy {
        self.refresh
    }

    /// The query text with comments, extra whitespace and a trailing `;` removed.
    pub fn normalized_text(&self) -> String {
        normalize_query(&self.raw_text)
    }
}

/// Outcome of a query: exactly one of success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    Success(QuerySuccess),
    Failure(QueryFailure),
}

impl QueryResult {
    /// Builds a failed result from a local or remote error.
    pub fn failure(error: HogqlError) -> Self {
        Self::Failure(QueryFailure::from(error))
    }

    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success payload, if any.
    pub fn as_success(&self) -> Option<&QuerySuccess> {
        match self {
            Self::Success(success) => Some(success),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure payload, if any.
    pub fn as_failure(&self) -> Option<&QueryFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl From<HogqlError> for QueryResult {
    fn from(error: HogqlError) -> Self {
        Self::failure(error)
    }
}

/// Columnar result of a successful query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySuccess {
    /// Column names, in order.
    pub columns: Vec<String>,

    /// Rows of positional values.
    pub rows: Vec<Row>,

    /// Compiled query text reported by the API, or the submitted text.
    pub query_text: String,

    /// Wall-clock round trip, attached by the executor.
    #[serde(default)]
    pub execution_time_secs: f64,
}

impl QuerySuccess {
    /// Creates a success payload with the given columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>, query_text: impl Into<String>) -> Self {
        Self {
            columns,
            rows,
            query_text: query_text.into(),
            execution_time_secs: 0.0,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time_secs = duration.as_secs_f64();
        self
    }

    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there is nothing to tabulate.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Description of a failed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// Classification of the failure.
    pub kind: ErrorKind,

    /// Human-readable message.
    pub message: String,

    /// Full parsed API body, kept for diagnostics when the API embedded an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl QueryFailure {
    /// Creates a failure with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raw_response: None,
        }
    }

    /// Attaches the parsed API body.
    pub fn with_raw_response(mut self, raw: Value) -> Self {
        self.raw_response = Some(raw);
        self
    }
}

impl From<HogqlError> for QueryFailure {
    fn from(error: HogqlError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}
