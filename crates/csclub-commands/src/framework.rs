//! Poise framework setup and command registration logic.

use crate::error_handler::{on_error, CommandError};
use crate::extensions::{self, ExtensionRegistry};
use crate::metadata::CommandMetadata;
use chrono::{DateTime, Utc};
use csclub_common::GuildId;
use csclub_config::ConfigCache;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, info};

/// Application data accessible in all commands.
pub struct Data {
    /// Live configuration.
    pub config: Arc<ConfigCache>,
    /// Extension load state.
    pub extensions: Arc<ExtensionRegistry>,
    /// When the bot process started.
    pub started_at: DateTime<Utc>,
}

impl Data {
    /// Creates the shared data.
    pub fn new(config: Arc<ConfigCache>, extensions: Arc<ExtensionRegistry>) -> Self {
        Self {
            config,
            extensions,
            started_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &self.config)
            .field("extensions", &self.extensions.loaded())
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Prefix command context type.
pub type PrefixContext<'a> = poise::PrefixContext<'a, Data, Error>;

/// Creates a new Poise framework with every built-in extension registered.
pub fn create_framework() -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(framework_options())
}

/// Framework options shared by the bot and tests.
pub fn framework_options() -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: extensions::all_commands(),
        on_error: |error| Box::pin(on_error(error)),
        pre_command: |ctx| Box::pin(pre_command(ctx)),
        command_check: Some(|ctx| Box::pin(command_check(ctx))),
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        allowed_mentions: Some(serenity::CreateAllowedMentions::new()),
        prefix_options: poise::PrefixFrameworkOptions {
            dynamic_prefix: Some(|ctx| Box::pin(dynamic_prefix(ctx))),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Resolves the prefix for a message: the guild's prefix, else the default.
async fn dynamic_prefix(
    ctx: poise::PartialContext<'_, Data, Error>,
) -> Result<Option<String>, Error> {
    let config = ctx.data.config.get();
    let guild = ctx.guild_id.map(|id| GuildId(id.get()));
    Ok(Some(config.prefix_for(guild).to_string()))
}

/// Rejects commands whose extension is not loaded.
async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    match ctx.command().extension() {
        Some(extension) if !ctx.data().extensions.is_loaded(extension) => {
            Err(CommandError::ExtensionUnloaded(extension.to_string()).into())
        }
        _ => Ok(true),
    }
}

async fn pre_command(ctx: Context<'_>) {
    debug!(
        command = %ctx.command().qualified_name,
        author = %ctx.author().name,
        guild = ?ctx.guild_id(),
        "Invoking command"
    );
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Connected to {}", data_about_bot.user.tag());
        }
        serenity::FullEvent::CacheReady { guilds } => {
            let channels: usize = guilds
                .iter()
                .filter_map(|id| ctx.cache.guild(*id).map(|guild| guild.channels.len()))
                .sum();
            info!("Guilds  : {}", guilds.len());
            info!("Users   : {}", ctx.cache.user_count());
            info!("Channels: {}", channels);
        }
        _ => {}
    }
    Ok(())
}
