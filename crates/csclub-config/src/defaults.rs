//! Default values for every configuration section.

use crate::schema::{Config, LoggingSettings};
use std::collections::HashMap;
use std::path::PathBuf;

/// Prefix used when nothing else is configured.
pub const DEFAULT_PREFIX: &str = "]";

/// Default location of the token file.
pub const DEFAULT_TOKEN_FILE: &str = "config/token.txt";

impl Default for Config {
    fn default() -> Self {
        Self {
            default_prefix: DEFAULT_PREFIX.to_string(),
            prefixes: HashMap::new(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            dev_roles: HashMap::new(),
            disabled_extensions: Vec::new(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}
