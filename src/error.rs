//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for docindex-mcp operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a search-index payload cannot be loaded as a whole.
///
/// Individual malformed records are never reported through this type; they are
/// kept in place and skipped by search.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Payload file not found at the given path.
    #[error("search index not found at {}", path.display())]
    NotFound { path: PathBuf },
    /// Payload file exists but could not be read.
    #[error("failed to read search index at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The payload body is not valid JSON.
    #[error("search index is not valid JSON (line {line}, column {column}): {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// The JSON is valid but is neither a record array nor an object holding one.
    #[error("unexpected search index shape: {0}")]
    Shape(String),
}

impl LoadError {
    pub(crate) fn from_json(error: &serde_json::Error) -> Self {
        Self::Syntax {
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        }
    }
}

/// Error returned when a configuration file is unreadable or invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
