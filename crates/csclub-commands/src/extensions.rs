//! Extensions: named groups of commands that can be loaded and unloaded
//! while the bot runs.
//!
//! All extensions are compiled in. Loading or unloading one toggles whether
//! its commands may run; the commands themselves stay registered with the
//! framework and are rejected by the global command check while unloaded.

use crate::framework::{Data, Error};
use crate::metadata::{self, HelpCategory, Ownership};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

/// Extensions that cannot be unloaded, since nothing could load them again.
pub const PROTECTED_EXTENSIONS: &[&str] = &["cogs.dev"];

/// A compiled-in extension.
#[derive(Clone, Copy)]
pub struct Extension {
    /// Qualified name, e.g. `cogs.poll`.
    pub name: &'static str,
    /// Help category its commands are listed under.
    pub category: HelpCategory,
    /// Authors of the extension.
    pub authors: &'static [u64],
    /// Builds the extension's commands.
    pub commands: fn() -> Vec<poise::Command<Data, Error>>,
}

impl Extension {
    /// The extension's authors.
    pub fn ownership(&self) -> Ownership {
        Ownership::new(self.authors.iter().copied())
    }

    /// Builds the commands with their metadata attached.
    pub fn build_commands(&self) -> Vec<poise::Command<Data, Error>> {
        let mut commands = (self.commands)();
        for command in &mut commands {
            metadata::attach(command, self);
        }
        commands
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("authors", &self.authors)
            .finish_non_exhaustive()
    }
}

/// Every extension the bot ships with, in load order.
pub fn builtin() -> &'static [Extension] {
    static EXTENSIONS: [Extension; 5] = [
        crate::error_handler::EXTENSION,
        crate::cogs::dev::EXTENSION,
        crate::cogs::example::EXTENSION,
        crate::cogs::help::EXTENSION,
        crate::cogs::poll::EXTENSION,
    ];
    &EXTENSIONS
}

/// Commands of every built-in extension, metadata attached and qualified
/// names filled in.
pub fn all_commands() -> Vec<poise::Command<Data, Error>> {
    let mut commands: Vec<_> = builtin().iter().flat_map(Extension::build_commands).collect();
    poise::set_qualified_names(&mut commands);
    commands
}

/// Completes a bare extension name to `cogs.{name}`.
pub fn qualify(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("cogs.{name}")
    }
}

/// Errors from loading and unloading extensions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// No extension with this name exists.
    #[error("Extension '{0}' could not be found.")]
    NotFound(String),

    /// The extension is already loaded.
    #[error("Extension '{0}' is already loaded.")]
    AlreadyLoaded(&'static str),

    /// The extension is not loaded.
    #[error("Extension '{0}' has not been loaded.")]
    NotLoaded(&'static str),

    /// The extension may not be unloaded.
    #[error("Extension '{0}' cannot be unloaded.")]
    Protected(&'static str),
}

/// Tracks which extensions are loaded.
#[derive(Debug)]
pub struct ExtensionRegistry {
    known: Vec<&'static str>,
    loaded: RwLock<Vec<&'static str>>,
}

impl ExtensionRegistry {
    /// A registry of `known` extensions, none loaded.
    pub fn new(known: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            known: known.into_iter().collect(),
            loaded: RwLock::new(Vec::new()),
        }
    }

    /// A registry of the built-in extensions, none loaded.
    pub fn builtin() -> Self {
        Self::new(builtin().iter().map(|extension| extension.name))
    }

    /// Looks up a known extension by name, completing bare names.
    pub fn find(&self, name: &str) -> Result<&'static str, ExtensionError> {
        let qualified = qualify(name.trim());
        self.known
            .iter()
            .copied()
            .find(|known| *known == qualified)
            .ok_or(ExtensionError::NotFound(qualified))
    }

    /// Loads an extension.
    pub fn load(&self, name: &str) -> Result<&'static str, ExtensionError> {
        let extension = self.find(name)?;
        let mut loaded = self.loaded.write();
        if loaded.contains(&extension) {
            return Err(ExtensionError::AlreadyLoaded(extension));
        }
        loaded.push(extension);
        debug!("Extension {} loaded", extension);
        Ok(extension)
    }

    /// Unloads an extension.
    pub fn unload(&self, name: &str) -> Result<&'static str, ExtensionError> {
        let extension = self.find(name)?;
        if PROTECTED_EXTENSIONS.contains(&extension) {
            return Err(ExtensionError::Protected(extension));
        }
        let mut loaded = self.loaded.write();
        let position = loaded
            .iter()
            .position(|loaded| *loaded == extension)
            .ok_or(ExtensionError::NotLoaded(extension))?;
        loaded.remove(position);
        debug!("Extension {} unloaded", extension);
        Ok(extension)
    }

    /// Reloads a loaded extension.
    pub fn reload(&self, name: &str) -> Result<&'static str, ExtensionError> {
        let extension = self.find(name)?;
        if !self.is_loaded(extension) {
            return Err(ExtensionError::NotLoaded(extension));
        }
        debug!("Extension {} reloaded", extension);
        Ok(extension)
    }

    /// Whether the extension with this qualified name is loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.read().iter().any(|loaded| *loaded == name)
    }

    /// Loaded extensions, in load order.
    pub fn loaded(&self) -> Vec<&'static str> {
        self.loaded.read().clone()
    }

    /// Every known extension.
    pub fn known(&self) -> &[&'static str] {
        &self.known
    }

    /// Loads every known extension not listed in `disabled`.
    ///
    /// Returns the number of cogs loaded.
    pub fn load_startup(&self, disabled: &[String]) -> usize {
        let disabled: Vec<String> = disabled.iter().map(|name| qualify(name)).collect();

        for &extension in &self.known {
            if disabled.iter().any(|name| name == extension) {
                info!("Skipping disabled module {}.", extension);
                continue;
            }
            if self.load(extension).is_ok() {
                info!("Loaded module {}.", extension);
            }
        }

        let cogs = self
            .loaded()
            .iter()
            .filter(|name| name.starts_with("cogs."))
            .count();
        info!("Loaded {} cogs", cogs);
        cogs
    }
}
