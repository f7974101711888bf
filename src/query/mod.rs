//! Query model, normalization and execution.
//!
//! This module isolates query text handling and execution from the
//! presentation layers.

pub mod executor;
pub mod normalizer;
mod types;

pub use executor::QueryExecutor;
pub use normalizer::normalize_query;
pub use types::{QueryFailure, QueryRequest, QueryResult, QuerySuccess, RefreshStrategy, Row, Value};
