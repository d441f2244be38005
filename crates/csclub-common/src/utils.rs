//! Shared string and time helpers.

use chrono::{DateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;

/// Formats a timestamp for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncates a string to at most `max_length` bytes, appending an ellipsis.
///
/// Never splits a UTF-8 character.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.len() <= max_length {
        return input.to_string();
    }
    let mut end = max_length.saturating_sub(3);
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}

/// Escapes Discord markdown control characters so the text renders literally.
pub fn escape_markdown(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '*' | '_' | '~' | '`' | '|' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Reverses a string by grapheme cluster, keeping emoji and combining marks intact.
pub fn reverse_graphemes(input: &str) -> String {
    input.graphemes(true).rev().collect()
}
