//! schemamap configuration types and loading

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the mapping endpoint
pub const API_URL_ENV: &str = "API_URL";

/// Environment variable holding the mapping service credential
pub const API_KEY_ENV: &str = "API_KEY";

/// Errors raised while loading or validating configuration
///
/// All of these are fatal: the process refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be configured (set the environment variable or the config file entry)")]
    Missing(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Main schemamap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mapping service endpoint and credential
    pub api: ApiConfig,

    /// Log sink configuration
    pub logging: LoggingConfig,

    /// File preview configuration
    pub preview: PreviewConfig,
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Logging section only, read before the subscriber exists
    ///
    /// Follows the same fallback chain as [`Config::load`] but never fails;
    /// anything unreadable yields the defaults and is reported by the full
    /// load once logging is up.
    pub fn load_logging(config_path: Option<&PathBuf>) -> LoggingConfig {
        Self::load_file_with(config_path, |_, _| {})
            .map(|config| config.logging)
            .unwrap_or_default()
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        Self::load_file_with(config_path, |path, e| {
            tracing::warn!("Failed to load config from {}: {}", path.display(), e);
        })
    }

    fn load_file_with<F>(config_path: Option<&PathBuf>, on_skipped: F) -> Result<Self, ConfigError>
    where
        F: Fn(&Path, &ConfigError),
    {
        // An explicit path must exist and parse
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Project-local .schemamap.yml, then ~/.config/schemamap/schemamap.yml
        let mut candidates = vec![PathBuf::from(".schemamap.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("schemamap").join("schemamap.yml"));
        }

        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return Ok(config),
                Err(e) => on_skipped(candidate, &e),
            }
        }

        debug!("load_file: no config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a YAML config file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Override file values with `API_URL` / `API_KEY` from the given lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            debug!("apply_env_with: {} set in environment", API_URL_ENV);
            self.api.url = Some(url);
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            debug!("apply_env_with: {} set in environment", API_KEY_ENV);
            self.api.key = Some(key);
        }
    }

    /// Resolve the endpoint and credential, failing fast if either is unusable
    pub fn api_settings(&self) -> Result<ApiSettings, ConfigError> {
        let url = non_blank(self.api.url.as_deref()).ok_or(ConfigError::Missing(API_URL_ENV))?;
        let key = non_blank(self.api.key.as_deref()).ok_or(ConfigError::Missing(API_KEY_ENV))?;

        Ok(ApiSettings {
            url: url.to_string(),
            key: key.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Mapping service configuration as read from file
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Mapping endpoint (overridden by `API_URL`)
    pub url: Option<String>,

    /// Credential (overridden by `API_KEY`)
    pub key: Option<String>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validated endpoint and credential, passed explicitly to the mapping client
#[derive(Clone)]
pub struct ApiSettings {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the log file, created on first run
    pub dir: PathBuf,

    /// Log file name inside `dir`
    pub file: String,

    /// Default level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,
}

impl LoggingConfig {
    /// Full path of the log file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: "app.log".to_string(),
            level: "INFO".to_string(),
        }
    }
}

/// File preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Rows shown when previewing an uploaded file
    pub rows: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { rows: 5 }
    }
}
