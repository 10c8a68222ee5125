//! Error types for the startup cache
//!
//! All modules use `StartupCacheResult<T>` as their return type. Read
//! failures during `load` are not errors: they are classified into
//! [`ReadFailure`](crate::cache::ReadFailure) and the store degrades to empty.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for startup cache operations
pub type StartupCacheResult<T> = Result<T, StartupCacheError>;

/// All errors that can occur in the startup cache
#[derive(Error, Debug)]
pub enum StartupCacheError {
    // Cache errors
    #[error("Failed to decode startup cache: {0}")]
    CacheDecode(String),

    #[error("Failed to encode startup cache: {0}")]
    CacheEncode(String),

    #[error("Failed to write startup cache {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache entry not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid cache entry for {key}: {reason}")]
    EntryInvalid { key: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StartupCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a cache write error for the given target path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWrite {
            path: path.into(),
            source,
        }
    }

    /// Check if error is retryable (another save may succeed)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CacheWrite { .. } | Self::Io { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheDecode(_) => Some("The cache file is stale or corrupt. Run: startup-cache invalidate"),
            Self::EntryInvalid { .. } => Some("Entries must be valid JSON, e.g. '{\"m\":\"hi\"}'"),
            Self::ConfigNotFound(_) => Some("Run: startup-cache config init"),
            _ => None,
        }
    }
}
