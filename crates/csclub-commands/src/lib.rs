//! # CS Club Commands
//!
//! Discord command implementations using the Poise framework for the CS Club
//! bot.
//!
//! Commands are grouped into extensions that can be loaded and unloaded at
//! runtime. Framework-level concerns live here too: prefix resolution, the
//! extension gate, and the central error reporter.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cogs;
pub mod error_handler;
pub mod extensions;
pub mod framework;
pub mod metadata;

pub use error_handler::CommandError;
pub use extensions::{Extension, ExtensionError, ExtensionRegistry};
pub use framework::*;
pub use metadata::{CommandMeta, CommandMetadata, HelpCategory, Ownership};
