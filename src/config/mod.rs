//! Configuration management for the startup cache

pub mod schema;

pub use schema::Config;

use crate::error::{StartupCacheError, StartupCacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("startup-cache")
            .join("config.toml")
    }

    /// Private data directory holding the cache file
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("startup-cache")
    }

    /// Default cache file path
    pub fn default_cache_file() -> PathBuf {
        Self::data_dir().join("startupCache.blob")
    }

    /// Default output of the jsonl telemetry sink
    pub fn telemetry_log_path() -> PathBuf {
        Self::data_dir().join("telemetry.jsonl")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> StartupCacheResult<Config> {
        match self.load_from_file(&self.config_path).await {
            Err(StartupCacheError::ConfigNotFound(_)) => {
                debug!("Config file not found, using defaults");
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> StartupCacheResult<Config> {
        let content = fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StartupCacheError::ConfigNotFound(path.to_path_buf()),
            _ => StartupCacheError::io(format!("reading config from {}", path.display()), e),
        })?;

        toml::from_str(&content).map_err(|e| StartupCacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> StartupCacheResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StartupCacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> StartupCacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StartupCacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
