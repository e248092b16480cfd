//! Configuration file parsing for logkeep
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::validate_log_name;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_log_name() -> String {
    DEFAULT_LOG_NAME.to_string()
}

fn default_max_dir_size() -> u64 {
    DEFAULT_MAX_DIR_SIZE
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_upload_interval_secs() -> u64 {
    DEFAULT_UPLOAD_INTERVAL_SECS
}

/// Remote endpoints used by the HTTP uploader
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UploadConfig {
    /// Base URL files are PUT to
    pub upload_url: Option<String>,
    /// Base URL uploaded files can be fetched from (defaults to `upload_url`)
    pub download_url: Option<String>,
}

impl UploadConfig {
    pub fn is_configured(&self) -> bool {
        self.upload_url.is_some()
    }
}

/// Store configuration (logkeep.toml/yaml/json)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Storage root; logs live under `<root_dir>/logs/<category>/`
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Logical stream name, wrapped as `log-<log_name>.log`
    #[serde(default = "default_log_name")]
    pub log_name: String,
    /// Postfix appended to archived names to tell identities apart
    #[serde(default)]
    pub rotate_postfix: String,
    /// Cleanup budget per category directory in bytes
    #[serde(default = "default_max_dir_size")]
    pub max_dir_size: u64,
    /// Size-rotation threshold in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Run local I/O synchronously on the caller thread
    #[serde(default)]
    pub immediate: bool,
    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
    /// Periodic upload interval in seconds
    #[serde(default = "default_upload_interval_secs")]
    pub upload_interval_secs: u64,
    /// Where exports are written (defaults to `<root_dir>/exports`)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            log_name: default_log_name(),
            rotate_postfix: String::new(),
            max_dir_size: DEFAULT_MAX_DIR_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            immediate: false,
            debug: false,
            upload_interval_secs: DEFAULT_UPLOAD_INTERVAL_SECS,
            export_dir: None,
            upload: UploadConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Config rooted at `root_dir` with every other field defaulted
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Check values that would otherwise break the on-disk naming contract
    pub fn validate(&self) -> Result<()> {
        if !validate_log_name(&self.log_name) {
            return Err(Error::InvalidLogName(self.log_name.clone()));
        }
        if self.rotate_postfix.contains(|c| c == '/' || c == '\\') {
            return Err(Error::config(format!(
                "rotate_postfix must not contain path separators: {:?}",
                self.rotate_postfix
            )));
        }
        // An archived name ending in the active suffix would be treated as active
        if self.rotate_postfix.ends_with(LOG_FILE_NAME_SUFFIX) {
            return Err(Error::config(format!(
                "rotate_postfix must not end with {:?}",
                LOG_FILE_NAME_SUFFIX
            )));
        }
        if self.max_dir_size == 0 || self.max_file_size == 0 {
            return Err(Error::config("max_dir_size and max_file_size must be non-zero"));
        }
        if self.upload_interval_secs == 0 {
            return Err(Error::config("upload_interval_secs must be non-zero"));
        }
        Ok(())
    }

    /// `<root_dir>/logs`
    pub fn logs_dir(&self) -> PathBuf {
        logs_dir(&self.root_dir)
    }

    /// Resolved export directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| exports_dir(&self.root_dir))
    }

    pub fn upload_interval(&self) -> Duration {
        Duration::from_secs(self.upload_interval_secs)
    }
}
