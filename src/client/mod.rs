//! PostHog query API clients.
//!
//! Provides a trait-based interface for query execution so the executor and
//! the explorer driver can run against the real API or an in-memory mock.

mod mock;
mod posthog;

pub use mock::MockQueryClient;
pub use posthog::PostHogClient;

use crate::credentials::Credentials;
use crate::error::Result;
use crate::query::{QueryRequest, QueryResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates a client for the PostHog API with the given credentials.
pub fn connect(credentials: Credentials) -> Result<Box<dyn QueryClient>> {
    Ok(Box::new(PostHogClient::new(credentials)?))
}

/// Trait defining the interface for query clients.
///
/// Every outcome, including network failures, is reported as a
/// [`QueryResult`] rather than an error.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Executes a single query and classifies the response.
    async fn execute(&self, request: &QueryRequest) -> QueryResult;
}

#[async_trait]
impl<T: QueryClient + ?Sized> QueryClient for Arc<T> {
    async fn execute(&self, request: &QueryRequest) -> QueryResult {
        (**self).execute(request).await
    }
}
