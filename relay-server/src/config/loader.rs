//! Configuration loader

use std::path::Path;

use relay_utils::{config_file, RelayError, Result};

use super::AppConfig;

/// Largest accepted `history_size`
const MAX_HISTORY_SIZE: usize = 10_000;

/// Smallest accepted `max_line_length`
const MIN_LINE_LENGTH: usize = 64;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<AppConfig> {
        let path = config_file();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(AppConfig::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(RelayError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| RelayError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    pub fn parse(content: &str, path: &Path) -> Result<AppConfig> {
        toml::from_str(content).map_err(|e| RelayError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<()> {
        let server = &config.server;

        if server.history_size == 0 || server.history_size > MAX_HISTORY_SIZE {
            return Err(RelayError::config(format!(
                "history_size must be between 1 and {}",
                MAX_HISTORY_SIZE
            )));
        }

        if server.outbound_buffer == 0 {
            return Err(RelayError::config("outbound_buffer must be at least 1"));
        }

        if server.max_line_length < MIN_LINE_LENGTH {
            return Err(RelayError::config(format!(
                "max_line_length must be at least {}",
                MIN_LINE_LENGTH
            )));
        }

        if server.write_timeout_ms == Some(0) {
            return Err(RelayError::config(
                "write_timeout_ms must be positive (omit it to disable)",
            ));
        }

        if server.host.trim().is_empty() {
            return Err(RelayError::config("host must not be empty"));
        }

        Ok(())
    }

    /// Load from `path` (or the default location) and validate
    pub fn load_and_validate(path: Option<&Path>) -> Result<AppConfig> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Self::validate(&config)?;
        Ok(config)
    }
}
