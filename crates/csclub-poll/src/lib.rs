//! # CS Club Poll
//!
//! Reaction-string parsing for the CS Club bot's poll command.
//!
//! A reaction string such as `"A-D"`, `"0..3"`, `"y n ?"` or a list of emoji
//! is scanned with a small grammar, each match is resolved to emoji, and the
//! result is attached to a message by a [`ReactionEmitter`]. The crate does
//! no I/O of its own: Discord access goes through [`EmojiCatalog`] and
//! [`ReactionSurface`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod alias;
pub mod emitter;
pub mod grammar;
pub mod parser;
pub mod token;

pub use emitter::{EmitReport, ReactionEmitter, ReactionSurface, BLANK_TEXT, REACTION_CAP};
pub use grammar::{Grammar, ReactionMatch};
pub use parser::{
    parse, EmojiCatalog, MessageContext, ReactionParser, Resolution, ResolutionError, ScanOutcome,
};
pub use token::{CustomEmoji, EmojiToken};
