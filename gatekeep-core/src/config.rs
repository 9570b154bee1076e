//! Configuration management

use crate::error::{ErrorContext, GatekeepError, GatekeepResult};
use crate::logging::{LoggingConfig, LOG_LEVELS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration, read from `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeepConfig {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub reset: ResetConfig,
}

/// Record store selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the store. When unset an in-memory store is used.
    pub path: Option<String>,
    /// Records the in-memory store starts with
    pub records: Vec<String>,
}

/// Password reset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Base URL the reset link is built from
    pub link_base_url: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            link_base_url: "http://localhost:8080/reset".to_string(),
        }
    }
}

/// `<config_dir>/gatekeep/config.toml`, falling back to `~/.config`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("gatekeep").join("config.toml"))
}

/// Locations probed, in order, when no explicit path is given
pub fn candidate_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(default_config_path());
    paths.extend(dirs::home_dir().map(|d| d.join(".gatekeep").join("config.toml")));
    paths.push(PathBuf::from("gatekeep.toml"));
    paths
}

impl GatekeepConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> GatekeepResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GatekeepError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        toml::from_str(&content).map_err(|e| GatekeepError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Save configuration to file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GatekeepResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| GatekeepError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| GatekeepError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GatekeepResult<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(
                format!("Unknown log level '{}'", self.logging.level),
                "Use one of trace, debug, info, warn, error",
            ));
        }

        if self.logging.log_to_file && self.logging.log_file_path.is_none() {
            return Err(invalid(
                "logging.log_file_path is required when log_to_file is true".to_string(),
                "Set logging.log_file_path or disable log_to_file",
            ));
        }

        let url = &self.reset.link_base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid(
                format!("reset.link_base_url must be an http(s) URL, got '{}'", url),
                "Set reset.link_base_url to e.g. https://example.com/reset",
            ));
        }

        if self.store.records.iter().any(|r| r.trim().is_empty()) {
            return Err(invalid(
                "store.records must not contain empty identifiers".to_string(),
                "Remove blank entries from store.records",
            ));
        }

        if matches!(&self.store.path, Some(p) if p.trim().is_empty()) {
            return Err(invalid(
                "store.path must not be empty when set".to_string(),
                "Remove store.path to use the in-memory store",
            ));
        }

        Ok(())
    }
}

fn invalid(message: String, suggestion: &str) -> GatekeepError {
    GatekeepError::Config {
        message,
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
