//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::loader::{ConfigError, ConfigLoader};
use crate::schema::Config;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

/// Live configuration shared by every command invocation.
pub struct ConfigCache {
    config: ArcSwap<Config>,
    loader: ConfigLoader,
}

impl ConfigCache {
    /// Creates a cache holding `config`, reloadable through `loader`.
    pub fn new(config: Config, loader: ConfigLoader) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            loader,
        }
    }

    /// Gets the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Updates the configuration atomically.
    pub fn update(&self, config: Config) {
        self.config.store(Arc::new(config));
    }

    /// Re-reads the configuration file and swaps it in.
    ///
    /// On error the previous configuration stays active.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let config = self.loader.load()?;
        info!("Configuration reloaded from {}", self.loader.path().display());
        self.update(config);
        Ok(self.get())
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("config", &self.get())
            .field("loader", &self.loader)
            .finish()
    }
}
