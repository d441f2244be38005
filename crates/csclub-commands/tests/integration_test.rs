//! Integration tests for csclub-commands crate.
//!
//! These tests verify command registration, the extension gate and help
//! rendering against the real command set.

use csclub_commands::cogs::dev::developer_access;
use csclub_commands::cogs::help::{HelpCatalog, Paginator, PAGE_LIMIT};
use csclub_commands::error_handler::{dev_notice, Developers};
use csclub_commands::extensions::{self, qualify};
use csclub_commands::metadata::{attach, with_ownership};
use csclub_commands::{CommandMetadata, Data, Error, ExtensionRegistry, HelpCategory, Ownership};
use csclub_common::test_utils::{discord_fixtures, init_test_logging};
use poise::serenity_prelude as serenity;
use proptest::prelude::*;

const POLL_AUTHOR: u64 = 141_294_044_671_246_337;

fn loaded_registry() -> ExtensionRegistry {
    let registry = ExtensionRegistry::builtin();
    registry.load_startup(&[]);
    registry
}

fn find<'a>(
    commands: &'a [poise::Command<Data, Error>],
    name: &str,
) -> &'a poise::Command<Data, Error> {
    commands
        .iter()
        .find(|command| command.name == name)
        .unwrap_or_else(|| panic!("command {name} is not registered"))
}

fn assert_has_meta(command: &poise::Command<Data, Error>) {
    assert!(
        command.meta().is_some(),
        "{} has no metadata",
        command.qualified_name
    );
    assert_eq!(
        command.category.as_deref(),
        command.help_category().map(HelpCategory::as_str)
    );
    for subcommand in &command.subcommands {
        assert_has_meta(subcommand);
    }
}

#[test]
fn test_every_command_has_metadata() {
    init_test_logging();
    let commands = extensions::all_commands();
    assert!(!commands.is_empty());
    for command in &commands {
        assert_has_meta(command);
    }
}

#[test]
fn test_command_categories() {
    let commands = extensions::all_commands();
    let category = |name: &str| find(&commands, name).help_category().map(HelpCategory::as_str);

    assert_eq!(category("poll"), Some("Utils"));
    assert_eq!(category("help"), Some("Misc"));
    assert_eq!(category("reload"), Some("Developer"));
    assert_eq!(category("greet"), Some("Example"));
    assert_eq!(find(&commands, "poll").extension(), Some("cogs.poll"));
}

#[test]
fn test_poll_commands_are_owned() {
    let commands = extensions::all_commands();
    let poll = find(&commands, "poll");
    let authors: Vec<u64> = poll.ownership().authors().map(|id| id.0).collect();
    assert_eq!(authors, vec![POLL_AUTHOR]);
    assert_eq!(poll.aliases, vec!["polls".to_string()]);

    let lines = poll
        .subcommands
        .iter()
        .find(|command| command.name == "lines")
        .expect("poll lines is registered");
    assert_eq!(lines.extension(), Some("cogs.poll"));
    assert!(!lines.ownership().is_empty());
}

#[test]
fn test_declared_ownership_is_merged() {
    let extension = extensions::builtin()
        .iter()
        .find(|extension| extension.name == "cogs.poll")
        .expect("poll extension exists");

    let mut command: poise::Command<Data, Error> =
        with_ownership(poise::Command::default(), Ownership::new([7]));
    attach(&mut command, extension);

    let authors: Vec<u64> = command.ownership().authors().map(|id| id.0).collect();
    assert_eq!(authors, vec![7, POLL_AUTHOR]);
}

#[test]
fn test_dev_commands_are_gated() {
    let commands = extensions::all_commands();
    for name in ["update", "reload", "load", "unload", "die", "version"] {
        assert_eq!(find(&commands, name).checks.len(), 1, "{name} is not gated");
    }
    let reload_all = find(&commands, "reload")
        .subcommands
        .iter()
        .find(|command| command.name == "all")
        .expect("reload all is registered");
    assert_eq!(reload_all.checks.len(), 1);
    assert!(find(&commands, "die").owners_only);
}

#[test]
fn test_startup_loads_everything_but_disabled() {
    let registry = ExtensionRegistry::builtin();
    let cogs = registry.load_startup(&["example".to_string()]);
    assert_eq!(cogs, 3);
    assert!(registry.is_loaded("core.error"));
    assert!(!registry.is_loaded("cogs.example"));
    assert_eq!(registry.known().len(), extensions::builtin().len());
}

#[test]
fn test_qualify_names() {
    assert_eq!(qualify("poll"), "cogs.poll");
    assert_eq!(qualify("cogs.poll"), "cogs.poll");
}

#[test]
fn test_help_lists_categories() {
    let commands = extensions::all_commands();
    let catalog = HelpCatalog::from_commands(&commands, &loaded_registry());
    assert_eq!(
        catalog.categories(),
        vec!["Developer", "Example", "Utils", "Misc"]
    );

    let pages = catalog.render("]", "help", None);
    assert_eq!(pages.len(), 1);
    let page = &pages[0];
    assert!(page.starts_with("**Categories:**\n"));
    assert!(page.contains("`Developer`"));
    assert!(page.ends_with(
        "`]help <command>` for in-depth help for a command\n`]help <category>` for commands in a category"
    ));
}

#[test]
fn test_help_hides_unloaded_extensions() {
    let registry = loaded_registry();
    registry.unload("poll").unwrap();
    let commands = extensions::all_commands();
    let catalog = HelpCatalog::from_commands(&commands, &registry);

    assert!(!catalog.categories().contains(&"Utils".to_string()));
    assert_eq!(
        catalog.render("]", "help", Some("poll")),
        vec!["No command called \"poll\" found."]
    );
}

#[test]
fn test_help_for_subcommand() {
    let commands = extensions::all_commands();
    let catalog = HelpCatalog::from_commands(&commands, &loaded_registry());
    let page = catalog.render("]", "help", Some("poll lines")).concat();
    assert!(page.starts_with("Help for `]poll lines`:"));
    assert!(page.contains("**Usage:**\n`]poll lines [content]`"));
    assert!(page.contains(&format!("*Authored by* <@{POLL_AUTHOR}>")));
}

#[test]
fn test_help_for_category() {
    let commands = extensions::all_commands();
    let catalog = HelpCatalog::from_commands(&commands, &loaded_registry());
    let page = catalog.render("?", "help", Some("utils")).concat();
    assert!(page.starts_with("**Utils commands:**\n"));
    assert!(page.contains(&format!("*Authored by* <@{POLL_AUTHOR}>")));
    assert!(page.contains("`?poll` Create a poll."));
}

#[test]
fn test_help_pages_fit_in_messages() {
    let commands = extensions::all_commands();
    let catalog = HelpCatalog::from_commands(&commands, &loaded_registry());
    for query in [None, Some("example"), Some("developer"), Some("random int")] {
        for page in catalog.render("]", "help", query) {
            assert!(page.chars().count() <= PAGE_LIMIT);
        }
    }
}

#[test]
fn test_developer_access_with_fixtures() {
    let role = discord_fixtures::test_role_id();
    assert!(developer_access(&[role], &[role], Some(serenity::Permissions::empty()), false));
    assert!(!developer_access(&[], &[role], Some(serenity::Permissions::empty()), false));
}

#[test]
fn test_dev_notice_mentions() {
    let author = discord_fixtures::test_user_id();
    assert_eq!(
        dev_notice("oops", &Developers::Found(vec![author.mention()])),
        format!("oops. You should probably inform <@{}>.", author.0)
    );
}

proptest! {
    #[test]
    fn prop_paginator_respects_page_size(lines in prop::collection::vec("[a-z ]{0,40}", 0..60)) {
        let mut pages = Paginator::new(50);
        for line in &lines {
            pages.add_line(line);
        }
        let pages = pages.finish();
        for page in &pages {
            prop_assert!(page.chars().count() <= 50);
        }
        let rejoined: Vec<&str> = pages.iter().flat_map(|page| page.split('\n')).collect();
        prop_assert_eq!(rejoined, lines.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn prop_bare_names_are_qualified(name in "[a-z_]{1,12}") {
        prop_assert_eq!(qualify(&name), format!("cogs.{name}"));
    }
}
