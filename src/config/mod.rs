//! Configuration for the sleet stream loader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration for sleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where output CSV files are created.
    ///
    /// Must already exist; the loader never creates it.
    pub output_folder: PathBuf,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile { source })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a JSON string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(contents).map_err(|source| ConfigError::JsonParse { source })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_folder.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputFolder);
        }
        Ok(())
    }
}
