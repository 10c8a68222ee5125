//! Configuration schema for the startup cache
//!
//! Configuration is stored at `~/.config/startup-cache/config.toml`

use super::ConfigManager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache file settings
    pub cache: CacheConfig,

    /// Telemetry output
    pub telemetry: TelemetryConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file location (defaults to the data directory)
    pub file: Option<PathBuf>,

    /// Version stamped into the blob; a mismatch on load discards the cache
    pub app_version: String,
}

impl CacheConfig {
    /// Effective cache file path
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(ConfigManager::default_cache_file)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Where telemetry records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetrySinkKind {
    /// Structured tracing events
    #[default]
    Log,
    /// JSON lines appended to a file
    Jsonl,
    /// Record nothing
    Disabled,
}

/// Telemetry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Sink kind
    pub sink: TelemetrySinkKind,

    /// Output file for the jsonl sink
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("sink = \"log\""));
    }

    #[test]
    fn parses_partial_config() {
        let toml = r#"
[cache]
file = "/tmp/custom.blob"

[telemetry]
sink = "jsonl"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.file_path(), PathBuf::from("/tmp/custom.blob"));
        assert_eq!(config.cache.app_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.telemetry.sink, TelemetrySinkKind::Jsonl);
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn default_file_under_data_dir() {
        let config = CacheConfig::default();
        assert_eq!(config.file_path(), ConfigManager::default_cache_file());
        assert!(config.file_path().ends_with("startup-cache/startupCache.blob"));
    }
}
