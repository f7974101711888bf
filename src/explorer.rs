//! Connection driver for database explorer tooling.
//!
//! Explorers talk to PostHog through a long-lived "connection" whose
//! settings are supplied by the explorer itself. Results are returned as
//! [`ExplorerResult`] records.

use tracing::{debug, info};

use crate::adapter::{to_explorer_result, ExplorerResult, QueryOptions};
use crate::client::{self, QueryClient};
use crate::credentials::{normalize_base_url, Credentials};
use crate::error::{CredentialField, HogqlError, Result};
use crate::query::{QueryExecutor, RefreshStrategy};

const SETTINGS_SOURCE: &str = "the connection settings";

const PROBE_QUERY: &str = "SELECT 1";

const DEFAULT_RECORD_LIMIT: usize = 50;

const TABLES: [&str; 2] = ["events", "persons"];

/// Connection settings supplied by the explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub id: String,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub api_url: Option<String>,
}

impl ConnectionSettings {
    fn credentials(&self) -> Result<Credentials> {
        let api_key = required(self.api_key.as_deref(), CredentialField::ApiKey)?;
        let project_id = required(self.project_id.as_deref(), CredentialField::ProjectId)?;
        let base_url = normalize_base_url(self.api_url.as_deref())?;
        Ok(Credentials::new(api_key, project_id, base_url))
    }
}

fn required(value: Option<&str>, field: CredentialField) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| HogqlError::missing_credential(field, SETTINGS_SOURCE))
}

/// A table entry shown in the explorer tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableItem {
    pub label: String,
    pub database: String,
}

/// Explorer connection lifecycle over a [`QueryExecutor`].
pub struct ExplorerDriver {
    settings: ConnectionSettings,
    executor: Option<QueryExecutor>,
}

impl ExplorerDriver {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            executor: None,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.executor.is_some()
    }

    /// Opens the connection against the PostHog API.
    ///
    /// Credentials come from the connection settings only. The connection is
    /// verified with a probe query before the driver is marked open.
    pub async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        let credentials = self.settings.credentials()?;
        info!(
            "Opening connection {} to {}",
            self.settings.id,
            credentials.display_string()
        );
        self.open_with(client::connect(credentials)?).await
    }

    /// Opens the connection over an already-built client.
    pub async fn open_with(&mut self, client: Box<dyn QueryClient>) -> Result<()> {
        let executor = QueryExecutor::new(client);
        probe(&executor).await?;
        self.executor = Some(executor);
        debug!("Connection {} is open", self.settings.id);
        Ok(())
    }

    pub fn close(&mut self) {
        if self.executor.take().is_some() {
            debug!("Connection {} closed", self.settings.id);
        }
    }

    /// Verifies the settings with a throwaway client without opening the driver.
    pub async fn test_connection(&self) -> Result<()> {
        let client = client::connect(self.settings.credentials()?)?;
        probe(&QueryExecutor::new(client)).await
    }

    /// Runs a query on the open connection.
    ///
    /// Every outcome is reported in the returned record, including a closed
    /// connection or a call addressed to another connection.
    pub async fn query(&self, query: &str, options: &QueryOptions) -> ExplorerResult {
        let conn_id = self.settings.id.as_str();

        if let Some(requested) = options.conn_id.as_deref() {
            if requested != conn_id {
                return ExplorerResult::failed(
                    conn_id,
                    query,
                    options,
                    format!("Mismatched connId. Expected {conn_id}, got {requested}"),
                );
            }
        }

        let Some(executor) = &self.executor else {
            return ExplorerResult::failed(conn_id, query, options, "No active connection found.");
        };

        let response = executor
            .execute_query(query, RefreshStrategy::default())
            .await;
        to_explorer_result(&response, conn_id, query, options)
    }

    /// Fetches the first `limit` rows of a table (50 when `limit` is zero).
    pub async fn show_records(
        &self,
        table: &str,
        limit: usize,
        options: &QueryOptions,
    ) -> ExplorerResult {
        let limit = if limit == 0 { DEFAULT_RECORD_LIMIT } else { limit };
        self.query(&format!("SELECT * FROM {table} LIMIT {limit}"), options)
            .await
    }

    /// Schema is not exposed by the query API; returns an empty result with a note.
    pub fn describe_table(&self, table: &str, options: &QueryOptions) -> ExplorerResult {
        let mut result = ExplorerResult::new(&self.settings.id, format!("DESCRIBE {table}"), options);
        result.cols = vec![
            "column_name".to_string(),
            "data_type".to_string(),
            "is_nullable".to_string(),
        ];
        result.messages.push(format!(
            "Schema information for '{table}' is not available via HogQL API."
        ));
        result
    }

    /// Column listing is not exposed by the query API; returns an empty result with a note.
    pub fn fetch_columns(&self, table: &str, options: &QueryOptions) -> ExplorerResult {
        let mut result =
            ExplorerResult::new(&self.settings.id, format!("COLUMNS FOR {table}"), options);
        result.cols = vec!["column_name".to_string(), "data_type".to_string()];
        result.messages.push(format!(
            "Column information for '{table}' is not available via HogQL API."
        ));
        result
    }

    pub fn list_tables(&self) -> Vec<TableItem> {
        self.search_tables("")
    }

    /// Tables whose name contains `search`, case-insensitively.
    pub fn search_tables(&self, search: &str) -> Vec<TableItem> {
        let search = search.to_lowercase();
        TABLES
            .iter()
            .filter(|table| table.contains(&search))
            .map(|table| TableItem {
                label: table.to_string(),
                database: self.settings.id.clone(),
            })
            .collect()
    }
}

async fn probe(executor: &QueryExecutor) -> Result<()> {
    let response = executor
        .execute_query(PROBE_QUERY, RefreshStrategy::default())
        .await;
    match response.result.as_failure() {
        Some(failure) => Err(HogqlError::transport(format!(
            "Connection test failed: {}",
            failure.message
        ))),
        None => Ok(()),
    }
}
