//! Integration tests for csclub-bot crate.
//!
//! These tests verify startup wiring without connecting to Discord.

use csclub_bot::{BotError, CsClubBot};
use csclub_common::test_utils::{config_fixtures, init_test_logging};
use csclub_config::{ConfigCache, ConfigError, ConfigLoader};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tempfile::TempDir;

fn bot_with_config(yaml: &str) -> (CsClubBot, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, yaml).unwrap();

    let loader = ConfigLoader::new(&path);
    let config = ConfigLoader::parse(yaml).unwrap();
    let cache = Arc::new(ConfigCache::new(config, loader));
    (CsClubBot::new(cache, "token".to_string()), dir)
}

#[test]
fn test_intents_include_message_content() {
    let intents = CsClubBot::intents();
    assert!(intents.contains(serenity::GatewayIntents::MESSAGE_CONTENT));
    assert!(intents.contains(serenity::GatewayIntents::GUILD_MESSAGES));
    assert!(!intents.contains(serenity::GatewayIntents::GUILD_PRESENCES));
}

#[test]
fn test_prepare_loads_startup_extensions() {
    init_test_logging();
    let (bot, _dir) = bot_with_config(config_fixtures::minimal_config_yaml());
    assert!(bot.extensions().loaded().is_empty());

    let data = bot.prepare();
    assert!(data.extensions.is_loaded("core.error"));
    assert!(data.extensions.is_loaded("cogs.poll"));
    assert_eq!(data.extensions.loaded().len(), bot.extensions().known().len());
}

#[test]
fn test_prepare_skips_disabled_extensions() {
    let (bot, _dir) = bot_with_config("disabled_extensions: [example]\n");
    let data = bot.prepare();
    assert!(!data.extensions.is_loaded("cogs.example"));
    assert!(data.extensions.is_loaded("cogs.help"));
}

#[test]
fn test_config_errors_convert() {
    let error: BotError = ConfigError::Missing("token".to_string()).into();
    assert_eq!(
        error.to_string(),
        "Configuration error: Missing required configuration: token"
    );
}
