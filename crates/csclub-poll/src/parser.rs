//! Turns a reaction string into an ordered, duplicate-free list of emoji.

use crate::alias;
use crate::grammar::{Grammar, ReactionMatch};
use crate::token::{CustomEmoji, EmojiToken};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace};

/// Custom emoji the bot can see, looked up by id.
pub trait EmojiCatalog: Send + Sync {
    /// Returns the emoji with this id, if the bot knows it.
    fn emoji(&self, id: u64) -> Option<CustomEmoji>;
}

impl EmojiCatalog for HashMap<u64, CustomEmoji> {
    fn emoji(&self, id: u64) -> Option<CustomEmoji> {
        self.get(&id).cloned()
    }
}

/// What the parser knows about the message the reactions will go on.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    /// The guild's custom emoji roster, `None` outside a guild.
    pub guild_emojis: Option<Vec<CustomEmoji>>,
    /// Custom emoji already attached to the message as reactions.
    pub reactions: Vec<CustomEmoji>,
}

impl MessageContext {
    fn reaction_by_id(&self, id: u64) -> Option<&CustomEmoji> {
        self.reactions.iter().find(|emoji| emoji.id == id)
    }

    fn reaction_by_name(&self, name: &str) -> Option<&CustomEmoji> {
        self.reactions.iter().find(|emoji| emoji.name == name)
    }
}

/// Result of resolving a single grammar match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The match stands for these emoji, in order.
    Tokens(Vec<EmojiToken>),
    /// The match has no meaning here and contributes nothing.
    Ignored,
    /// The match should have named an emoji but nothing matched it.
    Unresolved,
}

/// A match that could not be resolved at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A custom emoji id the bot does not know, with no message to search.
    #[error("unknown custom emoji {0}")]
    UnknownEmoji(u64),

    /// An emoji id that does not fit in a snowflake.
    #[error("invalid emoji id: {0}")]
    InvalidId(String),

    /// A range bound that is not a number.
    #[error("invalid range bound: {0}")]
    InvalidBound(String),

    /// A range element with no alias.
    #[error("no alias for {0}")]
    MissingAlias(String),
}

/// Outcome of scanning a whole reaction string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every match was resolved or skipped; duplicates removed.
    Tokens(Vec<EmojiToken>),
    /// A match could not be resolved and fallback was requested.
    Fallback,
}

impl ScanOutcome {
    /// The tokens to react with, substituting the fallback set if needed.
    pub fn into_tokens(self) -> Vec<EmojiToken> {
        match self {
            Self::Tokens(tokens) => tokens,
            Self::Fallback => alias::fallback_set(),
        }
    }
}

/// Configurable reaction-string parser.
///
/// ```
/// use csclub_poll::{CustomEmoji, Grammar, ReactionParser};
/// use std::collections::HashMap;
///
/// let catalog: HashMap<u64, CustomEmoji> = HashMap::new();
/// let tokens = ReactionParser::new(&catalog)
///     .grammar(Grammar::Full)
///     .parse("A-C");
/// assert_eq!(tokens.len(), 3);
/// ```
#[derive(Clone, Copy)]
pub struct ReactionParser<'a> {
    grammar: Grammar,
    catalog: &'a dyn EmojiCatalog,
    message: Option<&'a MessageContext>,
    fallback: bool,
}

impl<'a> ReactionParser<'a> {
    /// Full grammar, no message context, fallback enabled.
    pub fn new(catalog: &'a dyn EmojiCatalog) -> Self {
        Self {
            grammar: Grammar::Full,
            catalog,
            message: None,
            fallback: true,
        }
    }

    /// Sets the grammar.
    #[must_use]
    pub fn grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Sets the message the reactions are meant for.
    #[must_use]
    pub fn message(mut self, message: Option<&'a MessageContext>) -> Self {
        self.message = message;
        self
    }

    /// Whether an unresolvable match replaces everything with the fallback set.
    #[must_use]
    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Parses `input` into the reactions to attach.
    pub fn parse(&self, input: &str) -> Vec<EmojiToken> {
        self.scan(input).into_tokens()
    }

    /// Scans `input`, stopping at the first match that forces a fallback.
    pub fn scan(&self, input: &str) -> ScanOutcome {
        let mut tokens = Vec::new();

        for found in self.grammar.scan(input) {
            match self.resolve(found) {
                Ok(Resolution::Tokens(resolved)) => tokens.extend(resolved),
                Ok(Resolution::Ignored) => {}
                Ok(Resolution::Unresolved) if self.fallback => {
                    debug!(?found, "Unresolvable reaction, using fallback set");
                    return ScanOutcome::Fallback;
                }
                Ok(Resolution::Unresolved) => trace!(?found, "Skipping unresolvable reaction"),
                Err(err) => debug!(error = %err, "Skipping reaction match"),
            }
        }

        ScanOutcome::Tokens(dedup(tokens))
    }

    /// Resolves a single grammar match.
    pub fn resolve(&self, found: ReactionMatch<'_>) -> Result<Resolution, ResolutionError> {
        match found {
            ReactionMatch::NumericRange { left, right } => {
                let left = parse_bound(left)?;
                let right = parse_bound(right)?;
                expand(left, right, alias::number)
            }
            ReactionMatch::AlphaRange { left, right } => {
                let left = letter_code(left)?;
                let right = letter_code(right)?;
                expand(left, right, |code| alias::letter(char::from(code)))
            }
            ReactionMatch::CustomEmoji(id) => self.resolve_custom(id),
            ReactionMatch::InaccessibleEmoji(name) => Ok(self.resolve_named(name)),
            ReactionMatch::Unicode(emoji) => Ok(Resolution::Tokens(vec![EmojiToken::unicode(emoji)])),
            ReactionMatch::Misc(symbol) => Ok(alias::lookup(symbol)
                .map_or(Resolution::Unresolved, |token| {
                    Resolution::Tokens(vec![token.clone()])
                })),
        }
    }

    fn resolve_custom(&self, id: &str) -> Result<Resolution, ResolutionError> {
        let Ok(id) = id.parse::<u64>() else {
            // Too large to be a snowflake, so no emoji can have it.
            return match self.message {
                Some(_) => Ok(Resolution::Unresolved),
                None => Err(ResolutionError::InvalidId(id.to_string())),
            };
        };

        if let Some(emoji) = self.catalog.emoji(id) {
            return Ok(Resolution::Tokens(vec![emoji.into()]));
        }

        let message = self.message.ok_or(ResolutionError::UnknownEmoji(id))?;
        Ok(message
            .reaction_by_id(id)
            .map_or(Resolution::Unresolved, |emoji| {
                Resolution::Tokens(vec![emoji.clone().into()])
            }))
    }

    fn resolve_named(&self, name: &str) -> Resolution {
        let Some((message, roster)) = self
            .message
            .and_then(|message| message.guild_emojis.as_ref().map(|roster| (message, roster)))
        else {
            return Resolution::Ignored;
        };

        roster
            .iter()
            .find(|emoji| emoji.name == name)
            .or_else(|| message.reaction_by_name(name))
            .map_or(Resolution::Unresolved, |emoji| {
                Resolution::Tokens(vec![emoji.clone().into()])
            })
    }
}

impl std::fmt::Debug for ReactionParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionParser")
            .field("grammar", &self.grammar)
            .field("message", &self.message)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Parses a reaction string in one call.
pub fn parse(
    input: &str,
    grammar: Grammar,
    catalog: &dyn EmojiCatalog,
    message: Option<&MessageContext>,
    fallback: bool,
) -> Vec<EmojiToken> {
    ReactionParser::new(catalog)
        .grammar(grammar)
        .message(message)
        .fallback(fallback)
        .parse(input)
}

fn parse_bound(bound: &str) -> Result<u8, ResolutionError> {
    bound
        .parse()
        .map_err(|_| ResolutionError::InvalidBound(bound.to_string()))
}

fn letter_code(letter: char) -> Result<u8, ResolutionError> {
    u8::try_from(letter.to_ascii_uppercase())
        .map_err(|_| ResolutionError::InvalidBound(letter.to_string()))
}

/// Maps every value from `left` to `right` inclusive, in that direction.
fn expand(
    left: u8,
    right: u8,
    lookup: impl Fn(u8) -> Option<&'static EmojiToken>,
) -> Result<Resolution, ResolutionError> {
    let values: Vec<u8> = if left <= right {
        (left..=right).collect()
    } else {
        (right..=left).rev().collect()
    };

    values
        .into_iter()
        .map(|value| {
            lookup(value)
                .cloned()
                .ok_or_else(|| ResolutionError::MissingAlias(value.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Resolution::Tokens)
}

/// Removes repeated tokens, keeping the first occurrence of each.
fn dedup(tokens: Vec<EmojiToken>) -> Vec<EmojiToken> {
    let mut seen = HashSet::with_capacity(tokens.len());
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HashMap<u64, CustomEmoji> {
        HashMap::from([(839_223_803_573_043_240, CustomEmoji::new(839_223_803_573_043_240, "panic"))])
    }

    #[test]
    fn test_expand_directions() {
        let up = expand(2, 4, alias::number).unwrap();
        let down = expand(4, 2, alias::number).unwrap();
        let Resolution::Tokens(mut up) = up else { panic!("expected tokens") };
        let Resolution::Tokens(down) = down else { panic!("expected tokens") };
        up.reverse();
        assert_eq!(up, down);
    }

    #[test]
    fn test_range_bound_without_alias() {
        assert_eq!(
            expand(9, 11, alias::number),
            Err(ResolutionError::MissingAlias("11".to_string()))
        );
    }

    #[test]
    fn test_custom_emoji_from_catalog() {
        let catalog = catalog();
        let tokens = ReactionParser::new(&catalog).parse("<:panic:839223803573043240>");
        assert_eq!(tokens, vec![EmojiToken::Custom(CustomEmoji::new(839_223_803_573_043_240, "panic"))]);
    }

    #[test]
    fn test_unknown_custom_without_message_is_skipped() {
        let catalog = catalog();
        let parser = ReactionParser::new(&catalog);
        assert_eq!(
            parser.resolve(ReactionMatch::CustomEmoji("1")),
            Err(ResolutionError::UnknownEmoji(1))
        );
        assert_eq!(parser.scan("A<:gone:1>B"), ScanOutcome::Tokens(vec![
            EmojiToken::unicode("🇦"),
            EmojiToken::unicode("🇧"),
        ]));
    }

    #[test]
    fn test_oversized_custom_id() {
        let catalog = catalog();
        let message = MessageContext::default();
        let input = "A<:x:99999999999999999999999>";

        let parser = ReactionParser::new(&catalog).message(Some(&message));
        assert_eq!(parser.scan(input), ScanOutcome::Fallback);
        assert_eq!(parser.parse(input), alias::fallback_set());

        let parser = ReactionParser::new(&catalog);
        assert_eq!(
            parser.resolve(ReactionMatch::CustomEmoji("99999999999999999999999")),
            Err(ResolutionError::InvalidId("99999999999999999999999".to_string()))
        );
        assert_eq!(parser.parse(input), vec![EmojiToken::unicode("🇦")]);
    }

    #[test]
    fn test_custom_emoji_from_message_reactions() {
        let catalog: HashMap<u64, CustomEmoji> = HashMap::new();
        let message = MessageContext {
            guild_emojis: None,
            reactions: vec![CustomEmoji::new(7, "seven")],
        };
        let tokens = ReactionParser::new(&catalog)
            .message(Some(&message))
            .parse("<:seven:7>");
        assert_eq!(tokens, vec![EmojiToken::Custom(CustomEmoji::new(7, "seven"))]);
    }

    #[test]
    fn test_named_emoji_needs_guild() {
        let catalog: HashMap<u64, CustomEmoji> = HashMap::new();
        let dm = MessageContext::default();
        let parser = ReactionParser::new(&catalog).message(Some(&dm));
        assert_eq!(parser.resolve(ReactionMatch::InaccessibleEmoji("wave")), Ok(Resolution::Ignored));

        let guild = MessageContext {
            guild_emojis: Some(vec![CustomEmoji::new(3, "wave")]),
            reactions: vec![CustomEmoji::new(4, "clap")],
        };
        let parser = ReactionParser::new(&catalog).message(Some(&guild));
        assert_eq!(parser.parse(":wave::clap:"), vec![
            EmojiToken::Custom(CustomEmoji::new(3, "wave")),
            EmojiToken::Custom(CustomEmoji::new(4, "clap")),
        ]);
        assert_eq!(parser.scan(":nope:"), ScanOutcome::Fallback);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let a = EmojiToken::unicode("a");
        let b = EmojiToken::unicode("b");
        assert_eq!(dedup(vec![a.clone(), b.clone(), a.clone(), b.clone()]), vec![a, b]);
    }
}
