//! Configuration schema definitions using serde.

use csclub_common::{CsClubError, GuildId, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure for the bot.
///
/// Keys missing from the YAML file take their default values, so a user file
/// only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix used in DMs and in guilds without an override.
    pub default_prefix: String,
    /// Per-guild prefix overrides.
    pub prefixes: HashMap<GuildId, String>,
    /// File whose first line is the bot token.
    pub token_file: PathBuf,
    /// Per-guild roles whose members may use developer commands.
    pub dev_roles: HashMap<GuildId, Vec<RoleId>>,
    /// Extensions that are not loaded at startup.
    pub disabled_extensions: Vec<String>,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter; `RUST_LOG` overrides it.
    pub level: String,
    /// Optional log file, rotated daily.
    pub file: Option<PathBuf>,
    /// Emit JSON lines.
    pub json: bool,
}

impl Config {
    /// Command prefix for a message, given the guild it came from.
    pub fn prefix_for(&self, guild: Option<GuildId>) -> &str {
        guild
            .and_then(|id| self.prefixes.get(&id))
            .map_or(self.default_prefix.as_str(), String::as_str)
    }

    /// Developer roles configured for a guild.
    pub fn dev_roles_for(&self, guild: GuildId) -> &[RoleId] {
        self.dev_roles.get(&guild).map_or(&[], Vec::as_slice)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CsClubError> {
        if self.default_prefix.trim().is_empty() {
            return Err(CsClubError::Config(
                "default_prefix cannot be empty".to_string(),
            ));
        }

        if let Some((guild, _)) = self.prefixes.iter().find(|(_, p)| p.trim().is_empty()) {
            return Err(CsClubError::Config(format!(
                "prefix for guild {guild} cannot be empty"
            )));
        }

        Ok(())
    }
}

impl From<&LoggingSettings> for csclub_common::logging::LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            json_format: settings.json,
            file_path: settings.file.clone(),
            ..Self::default()
        }
    }
}
