//! Core bot logic using the Poise framework.

use crate::error::BotResult;
use csclub_commands::{create_framework, Data, ExtensionRegistry};
use csclub_config::ConfigCache;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};

/// Main bot structure.
pub struct CsClubBot {
    config: Arc<ConfigCache>,
    extensions: Arc<ExtensionRegistry>,
    token: String,
}

impl CsClubBot {
    /// Creates a new bot instance. No extension is loaded yet.
    pub fn new(config: Arc<ConfigCache>, token: String) -> Self {
        Self {
            config,
            extensions: Arc::new(ExtensionRegistry::builtin()),
            token,
        }
    }

    /// Gateway intents the bot connects with.
    pub fn intents() -> serenity::GatewayIntents {
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT
    }

    /// The extension registry shared with the commands.
    pub const fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    /// Loads the startup extensions and builds the data shared by every
    /// command.
    pub fn prepare(&self) -> Data {
        let disabled = self.config.get().disabled_extensions.clone();
        self.extensions.load_startup(&disabled);
        Data::new(Arc::clone(&self.config), Arc::clone(&self.extensions))
    }

    /// Starts the bot and runs until every shard has shut down.
    pub async fn start(self) -> BotResult<()> {
        let data = self.prepare();

        let framework = create_framework()
            .setup(move |_ctx, ready, _framework| {
                Box::pin(async move {
                    info!("Logged in as {}", ready.user.name);
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&self.token, Self::intents())
            .framework(framework)
            .await?;

        let shard_manager = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
                return;
            }
            info!("Received shutdown signal, shutting down");
            shard_manager.shutdown_all().await;
        });

        info!("Connecting to Discord");
        client.start().await?;
        info!("Bot stopped");
        Ok(())
    }
}
