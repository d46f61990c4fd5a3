use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::inputs::{ActionInputs, ResolvedConfig};
use crate::types::GreenlightConfig;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "greenlight.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Invalid(#[from] greenlight_core::Error),
}

impl From<ConfigError> for greenlight_core::Error {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Invalid(inner) => inner,
            ConfigError::ConfigNotFound(path) => {
                greenlight_core::Error::configuration(format!("Config file not found at {}", path.display()))
                    .with_detail("path", path.display().to_string())
            }
            other => greenlight_core::Error::configuration(other.to_string()),
        }
    }
}

/// Loads `greenlight.toml` and merges it with action inputs
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    config: GreenlightConfig,
}

impl ConfigManager {
    /// Manager with built-in defaults only
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Load config from a specific path
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: GreenlightConfig = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config file");

        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    /// Load the config named on the command line, or `greenlight.toml` in
    /// `dir` if it exists, or fall back to defaults.
    ///
    /// An explicitly named file must exist.
    pub async fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path).await;
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if tokio::fs::try_exists(&candidate).await? {
            Self::load_from(&candidate).await
        } else {
            Ok(Self::defaults())
        }
    }

    pub fn config(&self) -> &GreenlightConfig {
        &self.config
    }

    /// Path the config was read from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Merge action inputs over this config
    pub fn resolve(&self, inputs: &ActionInputs) -> Result<ResolvedConfig, ConfigError> {
        Ok(inputs.resolve(&self.config)?)
    }
}
