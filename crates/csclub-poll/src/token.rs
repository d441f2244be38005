//! Emoji tokens produced by the parser and consumed by the emitter.

use serenity::all::{EmojiId, ReactionType};
use std::fmt;

/// A guild-scoped custom emoji.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomEmoji {
    /// Snowflake id of the emoji.
    pub id: u64,
    /// Name without colons.
    pub name: String,
    /// Whether the emoji is animated.
    pub animated: bool,
}

impl CustomEmoji {
    /// Creates a non-animated custom emoji.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            animated: false,
        }
    }
}

/// A single reaction, ready to be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmojiToken {
    /// A unicode emoji, possibly several scalars long.
    Unicode(String),
    /// A custom emoji.
    Custom(CustomEmoji),
}

impl EmojiToken {
    /// Creates a unicode token.
    pub fn unicode(s: impl Into<String>) -> Self {
        Self::Unicode(s.into())
    }
}

impl fmt::Display for EmojiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(s) => f.write_str(s),
            Self::Custom(emoji) => write!(
                f,
                "<{}:{}:{}>",
                if emoji.animated { "a" } else { "" },
                emoji.name,
                emoji.id
            ),
        }
    }
}

impl From<CustomEmoji> for EmojiToken {
    fn from(emoji: CustomEmoji) -> Self {
        Self::Custom(emoji)
    }
}

impl From<&EmojiToken> for ReactionType {
    fn from(token: &EmojiToken) -> Self {
        match token {
            EmojiToken::Unicode(s) => Self::Unicode(s.clone()),
            EmojiToken::Custom(emoji) => Self::Custom {
                animated: emoji.animated,
                id: EmojiId::new(emoji.id),
                name: Some(emoji.name.clone()),
            },
        }
    }
}

impl From<&serenity::all::Emoji> for CustomEmoji {
    fn from(emoji: &serenity::all::Emoji) -> Self {
        Self {
            id: emoji.id.get(),
            name: emoji.name.clone(),
            animated: emoji.animated,
        }
    }
}

impl CustomEmoji {
    /// Extracts the custom emoji from a reaction, if it is one.
    pub fn from_reaction(reaction: &ReactionType) -> Option<Self> {
        match reaction {
            ReactionType::Custom { animated, id, name } => Some(Self {
                id: id.get(),
                name: name.clone().unwrap_or_default(),
                animated: *animated,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_markup() {
        assert_eq!(EmojiToken::unicode("🔟").to_string(), "🔟");
        assert_eq!(
            EmojiToken::from(CustomEmoji::new(826_351_259_636_072_478, "yes")).to_string(),
            "<:yes:826351259636072478>"
        );
        let animated = CustomEmoji {
            animated: true,
            ..CustomEmoji::new(5, "party")
        };
        assert_eq!(EmojiToken::from(animated).to_string(), "<a:party:5>");
    }

    #[test]
    fn test_reaction_type_round_trip() {
        let token = EmojiToken::from(CustomEmoji::new(42, "panic"));
        let reaction = ReactionType::from(&token);
        assert_eq!(
            CustomEmoji::from_reaction(&reaction),
            Some(CustomEmoji::new(42, "panic"))
        );
        assert_eq!(
            CustomEmoji::from_reaction(&ReactionType::from(&EmojiToken::unicode("❓"))),
            None
        );
    }
}
