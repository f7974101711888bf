//! Command-line argument parsing for the HogQL runner.
//!
//! Uses clap to parse CLI arguments. Credential flags form the override tier
//! of credential resolution; the config file supplies the explicit-argument
//! tier beneath them.

use crate::config::Config;
use crate::credentials::CredentialSources;
use crate::error::{HogqlError, Result};
use crate::query::RefreshStrategy;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Standalone HTML document.
    #[default]
    Html,
    /// Plain-text table with status lines.
    Table,
    /// The executor response as pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: html, table, or json"
            )),
        }
    }
}

/// Run HogQL queries against the PostHog API.
#[derive(Parser, Debug)]
#[command(name = "hogql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Query file to execute (must end in .sql)
    #[arg(value_name = "FILE", required_unless_present = "query", conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Inline query text
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// PostHog personal API key (overrides every other source)
    #[arg(long, value_name = "KEY", env = "POSTHOG_API_KEY_OVERRIDE", hide_env_values = true)]
    pub api_key: Option<String>,

    /// PostHog project ID (overrides every other source)
    #[arg(long, value_name = "ID", env = "POSTHOG_PROJECT_ID_OVERRIDE")]
    pub project_id: Option<String>,

    /// Custom API URL (e.g., https://eu.posthog.com)
    #[arg(long, value_name = "URL", env = "POSTHOG_API_URL")]
    pub api_url: Option<String>,

    /// Workspace root holding the .env file (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Refresh strategy (blocking, async, lazy_async, force_blocking, force_async, force_cache)
    #[arg(long, value_name = "STRATEGY")]
    pub refresh: Option<String>,

    /// Output format
    #[arg(short, long, value_name = "FORMAT", default_value = "html")]
    pub format: String,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the workspace root, defaulting to the current directory.
    pub fn workspace_root(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|e| {
                HogqlError::config(format!("Cannot determine current directory: {e}"))
            }),
        }
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.format.parse()
    }

    /// Refresh strategy from --refresh, then the config file.
    ///
    /// Without either, the command-line default of `blocking` applies.
    pub fn parse_refresh(&self, config: &Config) -> std::result::Result<RefreshStrategy, String> {
        match &self.refresh {
            Some(value) => value.parse(),
            None => Ok(config.posthog.refresh.unwrap_or(RefreshStrategy::HOST_DEFAULT)),
        }
    }

    /// Combines command-line flags with the config file into credential sources.
    pub fn credential_sources(&self, config: &Config) -> CredentialSources {
        let mut sources = config.posthog.credential_sources();
        sources.override_api_key = self.api_key.clone();
        sources.override_project_id = self.project_id.clone();
        if self.api_url.is_some() {
            sources.api_url = self.api_url.clone();
        }
        sources
    }
}

/// Checks that a query file is a `.sql` file inside the workspace root.
///
/// Returns the absolute path of the file.
pub fn validate_query_path(workspace_root: &Path, file: &Path) -> Result<PathBuf> {
    let is_sql = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
    if !is_sql {
        return Err(HogqlError::file(format!(
            "Not a .sql file: {}",
            file.display()
        )));
    }

    let path = if file.is_absolute() {
        file.to_path_buf()
    } else {
        workspace_root.join(file)
    };

    let root = canonical(workspace_root)?;
    let canonical_path = canonical(&path)?;
    if !canonical_path.starts_with(&root) {
        return Err(HogqlError::file(format!(
            "Query file {} is outside the workspace {}",
            file.display(),
            workspace_root.display()
        )));
    }

    Ok(canonical_path)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|_| HogqlError::file(format!("File not found: {}", path.display())))
}
