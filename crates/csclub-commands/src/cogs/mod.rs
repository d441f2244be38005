//! Command extensions shipped with the bot.

pub mod dev;
pub mod example;
pub mod help;
pub mod poll;
