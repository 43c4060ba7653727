#![forbid(unsafe_code)]

//! Text label placement with below/above fallback.

use bimview_render::buffer::{BLANK, CharBuffer};
use bimview_render::glyphs::FLOOR_GLYPH;
use unicode_width::UnicodeWidthStr;

/// Where a label ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    Below,
    Above,
}

/// Try to print `text` centered under `(x, y)`, else above it.
///
/// A row fits when the whole label lies inside the buffer and every target
/// cell is free (blank or floor fill). Labels are never truncated: when
/// neither row fits, nothing is drawn and `None` is returned.
pub fn place_label(buf: &mut CharBuffer, x: i32, y: i32, text: &str) -> Option<LabelPlacement> {
    let width = text.width() as i32;
    if width == 0 || width > i32::from(buf.width()) {
        return None;
    }
    let left = x.saturating_sub(width / 2);
    [
        (y.saturating_add(1), LabelPlacement::Below),
        (y.saturating_sub(1), LabelPlacement::Above),
    ]
        .into_iter()
        .find(|&(row, _)| row_is_free(buf, left, row, width))
        .map(|(row, placement)| {
            buf.print_text(left, row, text);
            placement
        })
}

fn row_is_free(buf: &CharBuffer, left: i32, row: i32, width: i32) -> bool {
    if left < 0 || row < 0 || left.saturating_add(width) > i32::from(buf.width()) || row >= i32::from(buf.height()) {
        return false;
    }
    (left..left + width).all(|x| {
        matches!(buf.get(x as u16, row as u16), Some(c) if c == BLANK || c == FLOOR_GLYPH)
    })
}
