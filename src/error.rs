//! Error types for the HogQL runner.
//!
//! Defines the error enum used for local, pre-flight and rendering failures,
//! plus a serializable kind tag carried by failed query results.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The credential field that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    ApiKey,
    ProjectId,
}

impl CredentialField {
    /// Human-readable field name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ApiKey => "PostHog API key",
            Self::ProjectId => "PostHog project ID",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main error type for HogQL runner operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HogqlError {
    /// A required credential was empty after every source was consulted.
    #[error("{field} is required. Set it via {sources}")]
    MissingCredential {
        field: CredentialField,
        sources: &'static str,
    },

    /// The query was empty after normalization (or the query file was blank).
    #[error("{0}")]
    EmptyQuery(String),

    /// Network failure or a non-2xx HTTP response.
    #[error("{0}")]
    Transport(String),

    /// The API answered at transport level but embedded an error in the body.
    #[error("{0}")]
    Upstream(String),

    /// The API answered 2xx with a body that does not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A result row does not have one value per column.
    #[error("Malformed row {row}: expected {expected} values, got {actual}")]
    MalformedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Rendering a successful result failed.
    #[error("Formatting error: {0}")]
    Formatting(String),

    /// Configuration errors (invalid config file, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query file could not be located or read.
    #[error("{0}")]
    File(String),
}

impl HogqlError {
    /// Creates a missing-credential error for the given field.
    pub fn missing_credential(field: CredentialField, sources: &'static str) -> Self {
        Self::MissingCredential { field, sources }
    }

    /// Creates an empty-query error with the given message.
    pub fn empty_query(msg: impl Into<String>) -> Self {
        Self::EmptyQuery(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an upstream error with the given message.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Creates an invalid-response error with the given message.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates a formatting error with the given message.
    pub fn formatting(msg: impl Into<String>) -> Self {
        Self::Formatting(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a file error with the given message.
    pub fn file(msg: impl Into<String>) -> Self {
        Self::File(msg.into())
    }

    /// Returns the classification tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::EmptyQuery(_) => ErrorKind::EmptyQuery,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::MalformedRow { .. } => ErrorKind::MalformedRow,
            Self::Formatting(_) => ErrorKind::Formatting,
            Self::Config(_) => ErrorKind::Config,
            Self::File(_) => ErrorKind::File,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        self.kind().category()
    }
}

/// Serializable classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    EmptyQuery,
    Transport,
    Upstream,
    InvalidResponse,
    MalformedRow,
    Formatting,
    Config,
    File,
}

impl ErrorKind {
    /// Returns the category label for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingCredential => "Missing Credential",
            Self::EmptyQuery => "Empty Query",
            Self::Transport => "Request Error",
            Self::Upstream => "API Query Error",
            Self::InvalidResponse => "Invalid Response",
            Self::MalformedRow => "Malformed Row",
            Self::Formatting => "Formatting Error",
            Self::Config => "Configuration Error",
            Self::File => "File Error",
        }
    }

    /// Returns true for failures detected before any network activity.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::EmptyQuery | Self::Config | Self::File
        )
    }
}

/// Result type alias using HogqlError.
pub type Result<T> = std::result::Result<T, HogqlError>;
