//! # CS Club Config
//!
//! YAML configuration for the CS Club bot.
//!
//! This crate provides the configuration schema, its defaults, loading with
//! environment overrides, and a lock-free cache that can be reloaded while
//! the bot runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;

pub use cache::*;
pub use defaults::*;
pub use loader::*;
pub use schema::*;
