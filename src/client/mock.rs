//! Mock query client for testing.
//!
//! Records every request and answers with canned results, so executor and
//! explorer logic can be exercised without a PostHog instance.

use super::QueryClient;
use crate::query::{QueryRequest, QueryResult, QuerySuccess, Value};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A mock query client that returns predefined results.
#[derive(Debug, Default)]
pub struct MockQueryClient {
    queued: Mutex<VecDeque<QueryResult>>,
    fallback: Option<QueryResult>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockQueryClient {
    /// Creates a mock that echoes each query back as a one-cell result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that answers every query with `result`.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            fallback: Some(result),
            ..Self::default()
        }
    }

    /// Queues a result to be returned by the next call, ahead of the fallback.
    pub fn push_result(&self, result: QueryResult) {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn echo(request: &QueryRequest) -> QueryResult {
        let query = request.normalized_text();
        QueryResult::Success(QuerySuccess::new(
            vec!["result".to_string()],
            vec![vec![Value::String(format!("Mock result for: {}", query))]],
            query,
        ))
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn execute(&self, request: &QueryRequest) -> QueryResult {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let queued = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        queued
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Self::echo(request))
    }
}
