//! # CS Club Bot
//!
//! Discord bot for the CS Club server.
//!
//! This is the main binary crate: it loads the configuration, sets up
//! logging and runs the Poise framework with the command extensions from
//! `csclub-commands`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;

pub use bot::*;
pub use error::*;
