#![forbid(unsafe_code)]

//! ANSI color emission for rendered text.
//!
//! Color is a presentation pass over finished text: each glyph's
//! [`GlyphCategory`] picks a foreground color, and SGR sequences are only
//! emitted when the color changes along a line.

use crate::compositor::{GlyphCategory, categorize};

/// Clear the screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

/// Foreground SGR code for a category, or `None` to keep the default color.
pub const fn category_color(category: GlyphCategory) -> Option<u8> {
    match category {
        GlyphCategory::Blank | GlyphCategory::Structure => None,
        GlyphCategory::Fill => Some(90),
        GlyphCategory::Equipment => Some(36),
        GlyphCategory::Electrical => Some(33),
        GlyphCategory::Particle => Some(93),
        GlyphCategory::Alert => Some(31),
    }
}

/// Colorize `text` line by line.
///
/// Only glyph cells are colored; ASCII letters and digits stay in the
/// default color so labels and headings read plainly.
pub fn colorize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        colorize_line(line, &mut out);
    }
    out
}

fn colorize_line(line: &str, out: &mut String) {
    let mut current: Option<u8> = None;
    for ch in line.chars() {
        let color = if ch.is_ascii_alphanumeric() || (ch.is_ascii_punctuation() && ch != '!') {
            None
        } else {
            category_color(categorize(ch))
        };
        if color != current {
            match color {
                Some(code) => {
                    out.push_str("\x1b[");
                    out.push_str(&code.to_string());
                    out.push('m');
                }
                None => out.push_str(RESET),
            }
            current = color;
        }
        out.push(ch);
    }
    if current.is_some() {
        out.push_str(RESET);
    }
}

/// Remove SGR sequences (`ESC [ ... m`) from `text`.
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_glyphs_are_red() {
        let s = colorize("a✗b");
        assert_eq!(s, "a\x1b[31m✗\x1b[0mb");
    }

    #[test]
    fn runs_share_one_sequence() {
        let s = colorize("●●●");
        assert_eq!(s.matches("\x1b[33m").count(), 1);
        assert!(s.ends_with(RESET));
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(colorize("Floor 1\n┌──┐"), "Floor 1\n┌──┐");
    }

    #[test]
    fn strip_inverts_colorize() {
        let text = "⊙ outlet ✗\n≈≈ → ∙";
        assert_eq!(strip(&colorize(text)), text);
    }
}
