//! Query execution with timing and provenance.
//!
//! Reads queries from files or takes them inline, runs them through a
//! [`QueryClient`] and attaches the measured round-trip time.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::adapter::{to_executor_response, ExecutorResponse};
use crate::client::{self, QueryClient};
use crate::credentials::{CredentialResolver, CredentialSources};
use crate::error::{HogqlError, Result};
use crate::query::{QueryRequest, QueryResult, RefreshStrategy};

/// Query executor over a single client instance.
pub struct QueryExecutor {
    client: Box<dyn QueryClient>,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(client: Box<dyn QueryClient>) -> Self {
        Self { client }
    }

    /// Resolves credentials and creates an executor backed by the PostHog API.
    ///
    /// Fails with `MissingCredential` before any network activity when the API
    /// key or project ID cannot be found.
    pub fn connect(sources: &CredentialSources, workspace_root: Option<&Path>) -> Result<Self> {
        let credentials = CredentialResolver::for_workspace(workspace_root)?.resolve(sources)?;
        info!("Connecting to {}", credentials.display_string());
        Ok(Self::new(client::connect(credentials)?))
    }

    /// Executes inline query text.
    pub async fn execute_query(&self, query: &str, refresh: RefreshStrategy) -> ExecutorResponse {
        let (result, elapsed) = self.timed(QueryRequest::new(query, refresh)).await;
        to_executor_response(result, elapsed, None)
    }

    /// Reads a query file and executes its contents.
    ///
    /// A missing or unreadable file and an empty file are reported as failed
    /// responses without contacting the API.
    pub async fn execute_query_from_file(
        &self,
        path: &Path,
        refresh: RefreshStrategy,
    ) -> ExecutorResponse {
        let full_path = absolute_path(path);

        let query = match read_query_file(&full_path) {
            Ok(query) => query,
            Err(e) => {
                return to_executor_response(QueryResult::failure(e), Duration::ZERO, Some(full_path))
            }
        };

        debug!("Executing query from {}", full_path.display());
        let (result, elapsed) = self.timed(QueryRequest::new(query, refresh)).await;
        to_executor_response(result, elapsed, Some(full_path))
    }

    async fn timed(&self, request: QueryRequest) -> (QueryResult, Duration) {
        let start = Instant::now();
        let result = self.client.execute(&request).await;
        let elapsed = start.elapsed();
        debug!(
            "Query finished in {:?} (success: {})",
            elapsed,
            result.is_success()
        );
        (result, elapsed)
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn read_query_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HogqlError::file(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        HogqlError::file(format!(
            "Error reading query file {}: {e}",
            path.display()
        ))
    })?;

    let query = content.trim();
    if query.is_empty() {
        return Err(HogqlError::empty_query("Query file is empty"));
    }
    Ok(query.to_string())
}
