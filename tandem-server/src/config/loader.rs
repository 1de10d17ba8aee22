//! Configuration loader

use std::path::Path;

use tandem_utils::{config_file, Result, TandemError};

use super::AppConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default location
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
        let content = std::fs::read_to_string(path).map_err(|e| TandemError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    pub fn parse(content: &str, path: &Path) -> Result<AppConfig> {
        toml::from_str(content).map_err(|e| TandemError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<()> {
        if config.polling.interval_ms < 100 {
            return Err(TandemError::config("interval_ms must be at least 100"));
        }

        if config.polling.max_duration_secs == 0 {
            return Err(TandemError::config("max_duration_secs must be greater than 0"));
        }

        if config.terminal.capture_lines == 0 {
            return Err(TandemError::config("capture_lines must be greater than 0"));
        }

        if config.terminal.capture_lines > config.terminal.scrollback_lines {
            return Err(TandemError::config(
                "capture_lines cannot exceed scrollback_lines",
            ));
        }

        if config.terminal.tmux_binary.trim().is_empty() {
            return Err(TandemError::config("tmux_binary must not be empty"));
        }

        if config.tools.local_model.trim().is_empty() {
            return Err(TandemError::config("local_model must not be empty"));
        }

        Ok(())
    }

    /// Load and validate
    pub fn load_and_validate() -> Result<AppConfig> {
        let config = Self::load()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load and validate from an explicit path, or the default location
    pub fn load_optional(path: Option<&Path>) -> Result<AppConfig> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Self::validate(&config)?;
        Ok(config)
    }
}
