//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Collection server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_list_resource")]
    pub list_resource: String,

    /// Unset means no client-side timeout
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:9595".to_string()
}

fn default_prefix() -> String {
    "/rest".to_string()
}

fn default_list_resource() -> String {
    "collNames".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
            list_resource: default_list_resource(),
            request_timeout_secs: None,
        }
    }
}

impl ServerConfig {
    /// Client settings for this server
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            prefix: self.prefix.clone(),
            list_resource: self.list_resource.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Theme persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    /// Where the theme flag is stored; defaults under the user config dir
    pub state_file: Option<String>,
}

impl ThemeConfig {
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::theme::default_state_path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Candidate config files, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("collbrowse").join("config.toml")),
            Some(PathBuf::from("./collbrowse.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    ///
    /// Returns the file the config came from, if any. A file that exists
    /// but cannot be read or parsed is an error rather than a silent
    /// fallback to defaults.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first existing file among `paths`, or defaults plus
    /// environment when none exists
    pub fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(url) = lookup("COLLBROWSE_BASE_URL") {
            self.server.base_url = url;
        }
        if let Some(prefix) = lookup("COLLBROWSE_PREFIX") {
            self.server.prefix = prefix;
        }
        if let Some(resource) = lookup("COLLBROWSE_LIST_RESOURCE") {
            self.server.list_resource = resource;
        }
        if let Some(timeout) = lookup("COLLBROWSE_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.server.request_timeout_secs = Some(secs);
            }
        }

        // Theme overrides
        if let Some(file) = lookup("COLLBROWSE_THEME_FILE") {
            self.theme.state_file = Some(file);
        }

        // Logging overrides
        if let Some(level) = lookup("COLLBROWSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("COLLBROWSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# collbrowse configuration
#
# Environment variables override these settings:
# - COLLBROWSE_BASE_URL
# - COLLBROWSE_PREFIX
# - COLLBROWSE_LIST_RESOURCE
# - COLLBROWSE_REQUEST_TIMEOUT_SECS
# - COLLBROWSE_THEME_FILE
# - COLLBROWSE_LOG_LEVEL
# - COLLBROWSE_LOG_FORMAT

[server]
# Root URL of the collection browser server
base_url = "http://localhost:9595"

# REST prefix in front of every resource
prefix = "/rest"

# Resource listing the collection names (older servers use "klassNames")
list_resource = "collNames"

# Request timeout in seconds (unset: no client-side timeout)
# request_timeout_secs = 30

[theme]
# File holding the persisted light/dark flag
# state_file = "~/.config/collbrowse/state.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
