//! Credential resolution for the PostHog API.
//!
//! Each field is resolved independently from three tiers, first non-empty
//! value wins:
//!
//! 1. an externally configured override,
//! 2. an explicit argument,
//! 3. the workspace `.env` file, then the ambient process environment.
//!
//! `.env` values are read into an explicit lookup table owned by the
//! resolver; the process environment is never modified.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CredentialField, HogqlError, Result};

/// Environment key holding the API key.
pub const API_KEY_VAR: &str = "POSTHOG_API_KEY";

/// Environment key holding the project ID.
pub const PROJECT_ID_VAR: &str = "POSTHOG_PROJECT_ID";

/// Default PostHog host, without the `/api` suffix.
pub const DEFAULT_API_HOST: &str = "https://us.posthog.com";

const API_KEY_SOURCES: &str =
    "--api-key, the `api_key` config entry, or POSTHOG_API_KEY in the workspace .env file or environment";

const PROJECT_ID_SOURCES: &str =
    "--project-id, the `project_id` config entry, or POSTHOG_PROJECT_ID in the workspace .env file or environment";

/// Resolved, immutable API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    project_id: String,
    base_url: String,
}

impl Credentials {
    /// Creates credentials from already-resolved values.
    pub fn new(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            base_url: base_url.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// API base URL, always ending in `/api`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a display-safe string (no API key) for logs and status lines.
    pub fn display_string(&self) -> String {
        format!("project {} @ {}", self.project_id, self.base_url)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Caller-supplied credential inputs for the first two tiers.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    /// Externally configured API key override (highest priority).
    pub override_api_key: Option<String>,

    /// Externally configured project ID override (highest priority).
    pub override_project_id: Option<String>,

    /// Explicitly passed API key.
    pub api_key: Option<String>,

    /// Explicitly passed project ID.
    pub project_id: Option<String>,

    /// Custom API base URL.
    pub api_url: Option<String>,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Override,
    Argument,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Argument => write!(f, "explicit argument"),
            Self::Environment => write!(f, ".env file or environment"),
        }
    }
}

#[derive(Debug, Clone)]
enum AmbientEnv {
    Process,
    Fixed(HashMap<String, String>),
}

/// Layered key lookup: `.env` file values first, then the ambient environment.
#[derive(Debug, Clone)]
pub struct EnvLayers {
    file: HashMap<String, String>,
    ambient: AmbientEnv,
}

impl Default for EnvLayers {
    fn default() -> Self {
        Self::process()
    }
}

impl EnvLayers {
    /// Looks up keys in the process environment only.
    pub fn process() -> Self {
        Self {
            file: HashMap::new(),
            ambient: AmbientEnv::Process,
        }
    }

    /// Uses fixed maps for both layers. Nothing is read from the process.
    pub fn from_maps(file: HashMap<String, String>, ambient: HashMap<String, String>) -> Self {
        Self {
            file,
            ambient: AmbientEnv::Fixed(ambient),
        }
    }

    /// Loads `<workspace_root>/.env` (if present) in front of the process environment.
    pub fn from_workspace(workspace_root: &Path) -> Result<Self> {
        let env_path = workspace_root.join(".env");
        let mut layers = Self::process();

        if env_path.is_file() {
            layers.file = read_dotenv(&env_path)?;
            info!("Loaded .env file from: {}", env_path.display());
        } else {
            warn!(".env file not found at: {}", env_path.display());
        }

        Ok(layers)
    }

    /// Returns the first non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.file.get(key).filter(|v| !v.is_empty()) {
            return Some(value.clone());
        }

        match &self.ambient {
            AmbientEnv::Process => std::env::var(key).ok().filter(|v| !v.is_empty()),
            AmbientEnv::Fixed(map) => map.get(key).filter(|v| !v.is_empty()).cloned(),
        }
    }
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        HogqlError::config(format!("Failed to read {}: {e}", path.display()))
    })?;

    let mut vars = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(dotenvy::Error::LineParse(line, index)) => {
                warn!(
                    "Skipping unparseable line in {} at index {}: {}",
                    path.display(),
                    index,
                    line
                );
            }
            Err(e) => {
                return Err(HogqlError::config(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        }
    }
    Ok(vars)
}

/// Resolves [`Credentials`] from override, argument and environment tiers.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    env: EnvLayers,
}

impl CredentialResolver {
    /// Creates a resolver over the given environment layers.
    pub fn new(env: EnvLayers) -> Self {
        Self { env }
    }

    /// Creates a resolver for an optional workspace root.
    ///
    /// Without a workspace root only the process environment is consulted.
    pub fn for_workspace(workspace_root: Option<&Path>) -> Result<Self> {
        match workspace_root {
            Some(root) => Ok(Self::new(EnvLayers::from_workspace(root)?)),
            None => {
                debug!("No workspace root given; skipping .env lookup");
                Ok(Self::new(EnvLayers::process()))
            }
        }
    }

    /// Resolves every field, failing before any network activity if one is missing.
    pub fn resolve(&self, sources: &CredentialSources) -> Result<Credentials> {
        let (api_key, key_source) = self
            .pick(
                sources.override_api_key.as_deref(),
                sources.api_key.as_deref(),
                API_KEY_VAR,
            )
            .ok_or_else(|| HogqlError::missing_credential(CredentialField::ApiKey, API_KEY_SOURCES))?;
        info!("Using API key from {key_source}.");

        let (project_id, project_source) = self
            .pick(
                sources.override_project_id.as_deref(),
                sources.project_id.as_deref(),
                PROJECT_ID_VAR,
            )
            .ok_or_else(|| {
                HogqlError::missing_credential(CredentialField::ProjectId, PROJECT_ID_SOURCES)
            })?;
        info!("Using project ID from {project_source}.");

        let base_url = normalize_base_url(sources.api_url.as_deref())?;
        info!("Using API base URL: {base_url}");

        Ok(Credentials::new(api_key, project_id, base_url))
    }

    fn pick(
        &self,
        override_value: Option<&str>,
        argument: Option<&str>,
        env_key: &str,
    ) -> Option<(String, CredentialSource)> {
        non_empty(override_value)
            .map(|v| (v, CredentialSource::Override))
            .or_else(|| non_empty(argument).map(|v| (v, CredentialSource::Argument)))
            .or_else(|| {
                self.env
                    .get(env_key)
                    .map(|v| (v, CredentialSource::Environment))
            })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Builds the API base URL from an optional custom URL.
///
/// A single trailing slash is dropped and `/api` appended unless already
/// present. Without a custom URL the default PostHog host is used.
pub fn normalize_base_url(custom: Option<&str>) -> Result<String> {
    let domain = match non_empty(custom) {
        Some(url) => {
            Url::parse(&url).map_err(|e| match e {
                url::ParseError::RelativeUrlWithoutBase => HogqlError::config(format!(
                    "Invalid API URL '{url}': missing scheme (e.g. https://{url})"
                )),
                e => HogqlError::config(format!("Invalid API URL '{url}': {e}")),
            })?;
            url.strip_suffix('/').map(String::from).unwrap_or(url)
        }
        None => DEFAULT_API_HOST.to_string(),
    };

    if domain.ends_with("/api") {
        Ok(domain)
    } else {
        Ok(format!("{domain}/api"))
    }
}
