//! Configuration loading utilities

use crate::Config;
use serde_yaml;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for stargraph_common::StarGraphError {
    fn from(err: ConfigError) -> Self {
        stargraph_common::StarGraphError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!("Loading configuration from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;

        config.validate_all().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// Search order: `STARGRAPH_CONFIG_PATH`, then `stargraph.yaml` and
    /// `stargraph.yml` in the working directory, then built-in defaults.
    /// Environment overrides apply in every case.
    pub fn load() -> stargraph_common::Result<Config> {
        let config = if let Ok(config_path) = env::var("STARGRAPH_CONFIG_PATH") {
            Self::load_config(&config_path)?
        } else if Path::new("stargraph.yaml").exists() {
            Self::load_config("stargraph.yaml")?
        } else if Path::new("stargraph.yml").exists() {
            Self::load_config("stargraph.yml")?
        } else {
            debug!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate_all().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> stargraph_common::Result<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        // GitHub configuration overrides
        if let Ok(token) = env::var("GITHUB_TOKEN") {
            config.github.token = token;
        }

        if let Ok(user) = env::var("GITHUB_USER") {
            config.github.user = Some(user);
        }

        // Output configuration overrides
        if let Ok(directory) = env::var("STARGRAPH_OUTPUT_DIR") {
            config.output.directory = directory;
        }

        if let Ok(summary_file) = env::var("STARGRAPH_SUMMARY_FILE") {
            config.output.summary_file = summary_file;
        }

        // Chart configuration overrides
        if let Ok(width) = env::var("STARGRAPH_CHART_WIDTH") {
            config.chart.width = width.parse().map_err(|e| ConfigError::EnvParseError {
                var: "STARGRAPH_CHART_WIDTH".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(height) = env::var("STARGRAPH_CHART_HEIGHT") {
            config.chart.height = height.parse().map_err(|e| ConfigError::EnvParseError {
                var: "STARGRAPH_CHART_HEIGHT".to_string(),
                source: Box::new(e),
            })?;
        }

        // Logging configuration overrides
        if let Ok(level) = env::var("STARGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}
