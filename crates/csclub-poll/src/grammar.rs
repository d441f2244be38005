//! Reaction-string grammar.
//!
//! The full grammar is one regex made of six alternatives, tried in order at
//! each position (leftmost-first):
//!
//! 1. numeric range, `0..10` or `3-7`
//! 2. alphabetic range, `A..F` or `q-z`
//! 3. custom emoji markup, `<:name:id>` or `<a:name:id>`
//! 4. a custom emoji the sender could not render, `:name:`
//! 5. a unicode emoji
//! 6. `10`, or any other single character
//!
//! Line mode only looks for a unicode emoji at the start of each line.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const NUM_RANGE: &str = r"(?P<nrange>(?P<nl>10|[0-9])(?:-|\.\.)(?P<nr>10|[0-9]))";
const ALPHA_RANGE: &str = r"(?P<arange>(?P<al>[A-Za-z])(?:-|\.\.)(?P<ar>[A-Za-z]))";
const CUSTOM_EMOJI: &str = r"(?:<a?:\w+?:(?P<custom>[0-9]+)>)";
const INACCESSIBLE_EMOJI: &str = r"(?::(?P<pcustname>\w+?):)";
const MISC: &str = r"(?P<misc>10|.)";

/// Regions with a flag emoji. Any other pair of regional indicators is two
/// separate letters.
const FLAG_REGIONS: &str = "\
    AC AD AE AF AG AI AL AM AO AQ AR AS AT AU AW AX AZ \
    BA BB BD BE BF BG BH BI BJ BL BM BN BO BQ BR BS BT BV BW BY BZ \
    CA CC CD CF CG CH CI CK CL CM CN CO CP CR CU CV CW CX CY CZ \
    DE DG DJ DK DM DO DZ EA EC EE EG EH ER ES ET EU \
    FI FJ FK FM FO FR GA GB GD GE GF GG GH GI GL GM GN GP GQ GR GS GT GU GW GY \
    HK HM HN HR HT HU IC ID IE IL IM IN IO IQ IR IS IT JE JM JO JP \
    KE KG KH KI KM KN KP KR KW KY KZ LA LB LC LI LK LR LS LT LU LV LY \
    MA MC MD ME MF MG MH MK ML MM MN MO MP MQ MR MS MT MU MV MW MX MY MZ \
    NA NC NE NF NG NI NL NO NP NR NU NZ OM PA PE PF PG PH PK PL PM PN PR PS PT PW PY \
    QA RE RO RS RU RW SA SB SC SD SE SG SH SI SJ SK SL SM SN SO SR SS ST SV SX SY SZ \
    TA TC TD TF TG TH TJ TK TL TM TN TO TR TT TV TW TZ UA UG UM UN US UY UZ \
    VA VC VE VG VI VN VU WF WS XK YE YT ZA ZM ZW";

/// Regex escape for the regional indicator of an uppercase ASCII letter.
fn indicator_escape(letter: u8) -> String {
    format!(r"\x{{{:X}}}", 0x1F1E6 + u32::from(letter - b'A'))
}

/// Any single emoji grapheme, followed by any number of VS16 selectors.
static UNICODE_EMOJI: Lazy<String> = Lazy::new(|| {
    let keycap = r"[0-9#*]\x{FE0F}?\x{20E3}";
    let tag_sequence = r"\x{1F3F4}[\x{E0020}-\x{E007E}]+\x{E007F}";
    let flags = FLAG_REGIONS
        .split_whitespace()
        .map(|region| region.bytes().map(indicator_escape).collect::<String>())
        .collect::<Vec<_>>()
        .join("|");
    let regional_flag = format!(r"{flags}|[\x{{1F1E6}}-\x{{1F1FF}}]");
    let modified = r"\p{Extended_Pictographic}(?:\x{FE0F}|[\x{1F3FB}-\x{1F3FF}])?";
    let pictographic = format!(r"{modified}(?:\x{{200D}}{modified})*");
    format!(r"(?P<emoji>(?:{keycap}|{tag_sequence}|{regional_flag}|{pictographic})\x{{FE0F}}*)")
});

static FULL_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        "{NUM_RANGE}|{ALPHA_RANGE}|{CUSTOM_EMOJI}|{INACCESSIBLE_EMOJI}|{}|{MISC}",
        *UNICODE_EMOJI
    );
    Regex::new(&pattern).expect("reaction grammar is a valid regex")
});

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?m)^(?:{})", *UNICODE_EMOJI)).expect("line grammar is a valid regex")
});

/// Which grammar to scan with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grammar {
    /// Ranges, aliases, and emoji anywhere in the string.
    #[default]
    Full,
    /// One leading unicode emoji per line.
    Lines,
}

impl Grammar {
    /// The compiled regex for this grammar.
    pub fn regex(self) -> &'static Regex {
        match self {
            Self::Full => &FULL_REGEX,
            Self::Lines => &LINE_REGEX,
        }
    }

    /// Scans `input` left to right, yielding non-overlapping matches.
    pub fn scan(self, input: &str) -> impl Iterator<Item = ReactionMatch<'_>> {
        self.regex()
            .captures_iter(input)
            .filter_map(|caps| ReactionMatch::classify(&caps))
    }
}

/// One match of the grammar, tagged by the alternative that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionMatch<'a> {
    /// `L..R` over `0..=10`; bounds are the captured text.
    NumericRange {
        /// Left bound.
        left: &'a str,
        /// Right bound.
        right: &'a str,
    },
    /// `L..R` over ASCII letters.
    AlphaRange {
        /// Left bound.
        left: char,
        /// Right bound.
        right: char,
    },
    /// `<:name:id>` markup; carries the id digits.
    CustomEmoji(&'a str),
    /// `:name:` left over when the sender's client could not resolve an emoji.
    InaccessibleEmoji(&'a str),
    /// A unicode emoji, selectors included.
    Unicode(&'a str),
    /// Any other symbol.
    Misc(&'a str),
}

impl<'a> ReactionMatch<'a> {
    fn classify(caps: &Captures<'a>) -> Option<Self> {
        if caps.name("nrange").is_some() {
            return Some(Self::NumericRange {
                left: caps.name("nl")?.as_str(),
                right: caps.name("nr")?.as_str(),
            });
        }
        if caps.name("arange").is_some() {
            return Some(Self::AlphaRange {
                left: caps.name("al")?.as_str().chars().next()?,
                right: caps.name("ar")?.as_str().chars().next()?,
            });
        }
        if let Some(id) = caps.name("custom") {
            return Some(Self::CustomEmoji(id.as_str()));
        }
        if let Some(name) = caps.name("pcustname") {
            return Some(Self::InaccessibleEmoji(name.as_str()));
        }
        if let Some(emoji) = caps.name("emoji") {
            return Some(Self::Unicode(emoji.as_str()));
        }
        caps.name("misc").map(|misc| Self::Misc(misc.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(input: &str) -> Vec<ReactionMatch<'_>> {
        Grammar::Full.scan(input).collect()
    }

    #[test]
    fn test_range_wins_over_single_characters() {
        assert_eq!(
            full("1-5"),
            vec![ReactionMatch::NumericRange { left: "1", right: "5" }]
        );
        assert_eq!(
            full("10..0"),
            vec![ReactionMatch::NumericRange { left: "10", right: "0" }]
        );
        assert_eq!(
            full("a-D"),
            vec![ReactionMatch::AlphaRange { left: 'a', right: 'D' }]
        );
    }

    #[test]
    fn test_ten_is_one_symbol() {
        assert_eq!(full("10"), vec![ReactionMatch::Misc("10")]);
        assert_eq!(
            full("1 0"),
            vec![
                ReactionMatch::Misc("1"),
                ReactionMatch::Misc(" "),
                ReactionMatch::Misc("0")
            ]
        );
    }

    #[test]
    fn test_custom_and_inaccessible_emoji() {
        assert_eq!(
            full("<:panic:839223803573043240>"),
            vec![ReactionMatch::CustomEmoji("839223803573043240")]
        );
        assert_eq!(
            full("<a:dance:12>"),
            vec![ReactionMatch::CustomEmoji("12")]
        );
        assert_eq!(full(":hello:"), vec![ReactionMatch::InaccessibleEmoji("hello")]);
    }

    #[test]
    fn test_unicode_emoji_absorbs_selectors() {
        assert_eq!(full("😀"), vec![ReactionMatch::Unicode("😀")]);
        assert_eq!(
            full("❤\u{FE0F}\u{FE0F}\u{FE0F}"),
            vec![ReactionMatch::Unicode("❤\u{FE0F}\u{FE0F}\u{FE0F}")]
        );
        assert_eq!(full("1️⃣"), vec![ReactionMatch::Unicode("1️⃣")]);
        assert_eq!(full("👍🏽"), vec![ReactionMatch::Unicode("👍🏽")]);
        assert_eq!(full("👩‍💻"), vec![ReactionMatch::Unicode("👩‍💻")]);
    }

    #[test]
    fn test_regional_indicators_pair_only_into_flags() {
        assert_eq!(full("🇺🇸"), vec![ReactionMatch::Unicode("🇺🇸")]);
        assert_eq!(
            full("🇦🇧🇽🇾"),
            vec![
                ReactionMatch::Unicode("🇦"),
                ReactionMatch::Unicode("🇧"),
                ReactionMatch::Unicode("🇽"),
                ReactionMatch::Unicode("🇾")
            ]
        );
        // CD is a flag, AB and BC are not.
        assert_eq!(
            full("🇦🇧🇨🇩"),
            vec![
                ReactionMatch::Unicode("🇦"),
                ReactionMatch::Unicode("🇧"),
                ReactionMatch::Unicode("🇨🇩")
            ]
        );
        assert_eq!(
            full("🇺🇸🇦"),
            vec![ReactionMatch::Unicode("🇺🇸"), ReactionMatch::Unicode("🇦")]
        );
    }

    #[test]
    fn test_line_mode_only_matches_line_starts() {
        let input = "😀 text\n🙂 more\nno emoji here 🎉";
        let matches: Vec<_> = Grammar::Lines.scan(input).collect();
        assert_eq!(
            matches,
            vec![ReactionMatch::Unicode("😀"), ReactionMatch::Unicode("🙂")]
        );
    }

    #[test]
    fn test_newline_matches_nothing() {
        assert_eq!(full("A\nB"), vec![ReactionMatch::Misc("A"), ReactionMatch::Misc("B")]);
    }
}
