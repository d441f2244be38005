//! Main entry point for the CS Club bot.

use csclub_bot::{BotResult, CsClubBot};
use csclub_common::logging::{init_logging, LoggingConfig};
use csclub_config::{read_token, ConfigCache, ConfigLoader};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> BotResult<()> {
    let loader = ConfigLoader::from_env();
    let config = loader.load()?;

    // Keeps the log file writer alive until exit.
    let _guard = init_logging(&LoggingConfig::from(&config.logging))?;
    info!("Starting CS Club bot {}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", loader.path().display());

    let token = read_token(&config)?;
    let cache = Arc::new(ConfigCache::new(config, loader));

    let bot = CsClubBot::new(cache, token);
    if let Err(e) = bot.start().await {
        error!("Bot failed: {}", e);
        return Err(e);
    }

    Ok(())
}
