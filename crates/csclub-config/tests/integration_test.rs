//! Integration tests for csclub-config crate.

use csclub_common::test_utils::{config_fixtures, discord_fixtures, property_testing};
use csclub_common::{GuildId, RoleId};
use csclub_config::{read_token, Config, ConfigCache, ConfigLoader, DEFAULT_PREFIX};
use proptest::prelude::*;
use std::path::PathBuf;

#[test]
fn test_default_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.default_prefix, DEFAULT_PREFIX);

    config.default_prefix = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_empty_guild_prefix_is_rejected() {
    let mut config = Config::default();
    config.prefixes.insert(GuildId(1), String::new());
    assert!(config.validate().is_err());
}

#[test]
fn test_prefix_resolution() {
    let mut config = Config::default();
    let guild = discord_fixtures::test_guild_id();
    config.prefixes.insert(guild, "!".to_string());

    assert_eq!(config.prefix_for(None), "]");
    assert_eq!(config.prefix_for(Some(guild)), "!");
    assert_eq!(config.prefix_for(Some(GuildId(1))), "]");
}

#[test]
fn test_full_fixture_parses() {
    let config = ConfigLoader::parse(config_fixtures::full_config_yaml()).unwrap();
    let guild = discord_fixtures::test_guild_id();

    assert_eq!(config.default_prefix, "]");
    assert_eq!(config.prefix_for(Some(guild)), "!");
    assert_eq!(config.token_file, PathBuf::from("secrets/token.txt"));
    assert_eq!(config.dev_roles_for(guild), &[discord_fixtures::test_role_id()]);
    assert_eq!(config.disabled_extensions, vec!["cogs.example".to_string()]);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn test_minimal_fixture_keeps_other_defaults() {
    let config = ConfigLoader::parse(config_fixtures::minimal_config_yaml()).unwrap();
    assert_eq!(config.default_prefix, "?");
    assert_eq!(config.token_file, Config::default().token_file);
    assert!(config.dev_roles_for(GuildId(1)).is_empty());
}

#[test]
fn test_missing_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("config.yml");
    let loader = ConfigLoader::new(&path);

    let config = loader.load().unwrap();
    assert_eq!(config.default_prefix, Config::default().default_prefix);
    assert!(path.exists());

    // The written template loads back to the same values
    let reloaded = ConfigLoader::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, Config::default());
}

#[test]
fn test_invalid_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, "default_prefix: [unclosed").unwrap();

    assert!(ConfigLoader::new(&path).load().is_err());
}

#[test]
fn test_config_cache_update_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, "default_prefix: \"?\"\n").unwrap();

    let loader = ConfigLoader::new(&path);
    let cache = ConfigCache::new(loader.load().unwrap(), loader);
    assert_eq!(cache.get().default_prefix, "?");

    let mut changed = (*cache.get()).clone();
    changed.dev_roles.insert(GuildId(9), vec![RoleId(10)]);
    cache.update(changed);
    assert_eq!(cache.get().dev_roles_for(GuildId(9)), &[RoleId(10)]);

    std::fs::write(&path, "default_prefix: \"$\"\n").unwrap();
    let reloaded = cache.reload().unwrap();
    assert_eq!(reloaded.default_prefix, "$");
    assert_eq!(cache.get().default_prefix, "$");
}

#[test]
fn test_failed_reload_keeps_previous_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, "default_prefix: \"?\"\n").unwrap();

    let loader = ConfigLoader::new(&path);
    let cache = ConfigCache::new(loader.load().unwrap(), loader);

    std::fs::write(&path, "default_prefix: \"\"\n").unwrap();
    assert!(cache.reload().is_err());
    assert_eq!(cache.get().default_prefix, "?");
}

#[test]
fn test_token_read_from_first_line() {
    if std::env::var("DISCORD_TOKEN").is_ok() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token.txt");
    std::fs::write(&token_path, "first.token.value\nignored\n").unwrap();

    let config = Config {
        token_file: token_path,
        ..Config::default()
    };
    assert_eq!(read_token(&config).unwrap(), "first.token.value");
}

proptest! {
    #[test]
    fn test_property_guild_prefix_wins(
        guild in property_testing::guild_id_strategy(),
        prefix in property_testing::prefix_strategy(),
    ) {
        let mut config = Config::default();
        config.prefixes.insert(guild, prefix.clone());
        prop_assert_eq!(config.prefix_for(Some(guild)), prefix.as_str());
        prop_assert_eq!(config.prefix_for(None), DEFAULT_PREFIX);
    }
}
