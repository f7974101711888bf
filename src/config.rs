//! Configuration management for the HogQL runner.
//!
//! Handles loading settings from a TOML file. Values found here act as the
//! explicit-argument tier of credential resolution: command-line overrides
//! beat them, the workspace `.env` file and environment lose to them.

use crate::credentials::CredentialSources;
use crate::error::{HogqlError, Result};
use crate::query::RefreshStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// PostHog API settings.
    #[serde(default)]
    pub posthog: PostHogConfig,
}

/// PostHog API settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PostHogConfig {
    /// Personal API key (prefer the workspace `.env` file for secrets).
    pub api_key: Option<String>,

    /// Project ID.
    pub project_id: Option<String>,

    /// Custom API URL, e.g. `https://eu.posthog.com`.
    pub api_url: Option<String>,

    /// Refresh strategy used when none is given on the command line.
    pub refresh: Option<RefreshStrategy>,
}

impl PostHogConfig {
    /// Builds credential sources with these settings as the explicit-argument tier.
    pub fn credential_sources(&self) -> CredentialSources {
        CredentialSources {
            api_key: self.api_key.clone(),
            project_id: self.project_id.clone(),
            api_url: self.api_url.clone(),
            ..Default::default()
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hogql-runner")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| HogqlError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            HogqlError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
