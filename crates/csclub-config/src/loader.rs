//! Configuration loading with environment overrides.

use crate::schema::Config;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading or writing a configuration file
    #[error("Failed to access {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error(transparent)]
    Validation(#[from] csclub_common::CsClubError),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl From<ConfigError> for csclub_common::CsClubError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation(inner) => inner,
            other => Self::Config(other.to_string()),
        }
    }
}

/// Loads the bot configuration from a YAML file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ConfigLoader {
    /// Creates a loader for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a loader for `CSCLUB_CONFIG`, or the default path.
    pub fn from_env() -> Self {
        Self::new(env::var("CSCLUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()))
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// If the file does not exist the defaults are written to it, so users
    /// get a template to edit. Environment overrides are applied afterwards
    /// and the result is validated.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = if self.path.exists() {
            debug!("Reading configuration from {}", self.path.display());
            let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
            Self::parse(&content)?
        } else {
            info!(
                "No configuration at {}, writing defaults",
                self.path.display()
            );
            let config = Config::default();
            self.save(&config)?;
            config
        };

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parses a YAML document; missing keys take defaults.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Writes the configuration to the loader's path, creating parent directories.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml::to_string(config)?;
        std::fs::write(&self.path, yaml).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(prefix) = env::var("CSCLUB_DEFAULT_PREFIX") {
            config.default_prefix = prefix;
        }

        if let Ok(level) = env::var("CSCLUB_LOG_LEVEL") {
            config.logging.level = level;
        }
    }
}

/// Reads the bot token: `DISCORD_TOKEN` if set, else the first line of the token file.
pub fn read_token(config: &Config) -> Result<String, ConfigError> {
    if let Ok(token) = env::var("DISCORD_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }

    let content = std::fs::read_to_string(&config.token_file).map_err(|source| ConfigError::Io {
        path: config.token_file.clone(),
        source,
    })?;
    token_from_file_content(&content).ok_or_else(|| {
        ConfigError::Missing(format!(
            "token file {} is empty",
            config.token_file.display()
        ))
    })
}

/// First non-empty line of a token file.
fn token_from_file_content(content: &str) -> Option<String> {
    content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_first_line_only() {
        assert_eq!(
            token_from_file_content("abc.def\nsecond line\n"),
            Some("abc.def".to_string())
        );
        assert_eq!(token_from_file_content(""), None);
        assert_eq!(token_from_file_content("\nabc"), None);
    }

    #[test]
    fn test_parse_empty_document_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(ConfigLoader::parse("prefixes: 12").is_err());
    }
}
