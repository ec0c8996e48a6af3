use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::config::types::Config;

/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "EXPENSE_FLOW_API_BASE_URL";
/// Overrides `api.timeout_seconds`.
pub const ENV_API_TIMEOUT: &str = "EXPENSE_FLOW_API_TIMEOUT";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/expense-flow/config.toml` on Linux, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("expense-flow").join("config.toml")
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            self.api.timeout_seconds =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::ValidationError {
                        message: format!("{} must be a whole number of seconds, got '{}'", ENV_API_TIMEOUT, raw),
                    })?;
        }
        self.validate()
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - `api.base_url` is an absolute http(s) URL
    /// - timeouts are non-zero
    /// - `default_page_size` is within `1..=max_page_size`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::ValidationError { message });

        match Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return invalid(format!(
                    "api.base_url must use http or https, got '{}'",
                    url.scheme()
                ))
            }
            Err(e) => return invalid(format!("api.base_url '{}' is not a valid URL: {}", self.api.base_url, e)),
        }

        if self.api.timeout_seconds == 0 {
            return invalid("api.timeout_seconds must be greater than 0".to_string());
        }
        if self.api.connect_timeout_seconds == 0 {
            return invalid("api.connect_timeout_seconds must be greater than 0".to_string());
        }

        let pagination = &self.pagination;
        if pagination.default_page_size == 0 || pagination.default_page_size > pagination.max_page_size {
            return invalid(format!(
                "pagination.default_page_size must be between 1 and {}, got {}",
                pagination.max_page_size, pagination.default_page_size
            ));
        }

        if self.display.currency.trim().is_empty() {
            return invalid("display.currency must not be empty".to_string());
        }

        Ok(())
    }

    /// Session file location: the configured override or the default.
    pub fn session_path(&self) -> PathBuf {
        self.session
            .storage_path
            .clone()
            .unwrap_or_else(crate::session::FileSessionStorage::default_path)
    }
}
