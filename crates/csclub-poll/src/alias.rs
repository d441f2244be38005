//! Symbol aliases usable in a reaction string.
//!
//! `A`-`Z` map to regional indicators, `0`-`10` to keycaps, and a handful of
//! punctuation symbols to the emoji they look like. The table is built on
//! first use and never modified.

use crate::token::{CustomEmoji, EmojiToken};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Code point of the regional indicator for `A`.
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// Custom emoji the server uses for yes/no/maybe votes.
const YES: (u64, &str) = (826_351_259_636_072_478, "yes");
const NO: (u64, &str) = (826_351_260_793_307_136, "no");
const MAYBE: (u64, &str) = (826_351_274_365_550_592, "maybe");

static ALIASES: Lazy<HashMap<String, EmojiToken>> = Lazy::new(|| {
    let mut map = HashMap::new();

    for (offset, letter) in ('A'..='Z').enumerate() {
        let code = REGIONAL_INDICATOR_A + offset as u32;
        if let Some(indicator) = char::from_u32(code) {
            map.insert(letter.to_string(), EmojiToken::Unicode(indicator.to_string()));
        }
    }

    for digit in 0..10 {
        map.insert(
            digit.to_string(),
            EmojiToken::Unicode(format!("{digit}\u{FE0F}\u{20E3}")),
        );
    }
    map.insert("10".to_string(), EmojiToken::unicode("\u{1F51F}"));

    for (symbol, (id, name)) in [("y", YES), ("n", NO), ("m", MAYBE)] {
        map.insert(symbol.to_string(), CustomEmoji::new(id, name).into());
    }
    map.insert("?".to_string(), EmojiToken::unicode("\u{2753}"));
    map.insert("!".to_string(), EmojiToken::unicode("\u{2757}"));
    map.insert("+".to_string(), EmojiToken::unicode("\u{2795}"));

    map
});

/// Looks up the emoji for a symbol.
pub fn lookup(symbol: &str) -> Option<&'static EmojiToken> {
    ALIASES.get(symbol)
}

/// Emoji for a number in `0..=10`.
pub fn number(n: u8) -> Option<&'static EmojiToken> {
    lookup(&n.to_string())
}

/// Emoji for an ASCII letter, either case.
pub fn letter(c: char) -> Option<&'static EmojiToken> {
    if c.is_ascii_alphabetic() {
        lookup(&c.to_ascii_uppercase().to_string())
    } else {
        None
    }
}

/// The `[yes, no, maybe]` set used when a reaction string cannot be honoured.
pub fn fallback_set() -> Vec<EmojiToken> {
    ["y", "n", "m"]
        .iter()
        .filter_map(|symbol| lookup(symbol).cloned())
        .collect()
}
