#![forbid(unsafe_code)]

//! Width-aware text helpers shared by the views.

use bimview_render::buffer::CharBuffer;
use bimview_render::glyphs::{BorderSet, Edges};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A horizontal rule `width` cells wide.
pub(crate) fn rule(ch: char, width: u16) -> String {
    std::iter::repeat_n(ch, usize::from(width)).collect()
}

/// Cells per world unit for fitting `extent` into `cells`, capped at `preferred`.
///
/// Zero, negative, or non-finite extents scale by 1.0.
pub(crate) fn grid_scale(extent: f64, cells: u16, preferred: f64) -> f64 {
    if !extent.is_finite() || extent <= 0.0 {
        return 1.0;
    }
    let fit = f64::from(cells.saturating_sub(1).max(1)) / extent;
    fit.min(preferred)
}

/// Draw a border on the outermost cells of `buf`.
pub(crate) fn draw_frame(buf: &mut CharBuffer, border: &BorderSet) {
    let (w, h) = (i32::from(buf.width()), i32::from(buf.height()));
    if w < 2 || h < 2 {
        return;
    }
    for y in 0..h {
        for x in 0..w {
            if let Some(ch) = border.glyph_for(Edges::at(x, y, 0, 0, w - 1, h - 1)) {
                buf.set(x as u16, y as u16, ch);
            }
        }
    }
}

/// Truncate to at most `width` display cells, marking the cut with `…`.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Left-align in exactly `width` display cells.
pub(crate) fn pad(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_scales_by_one() {
        assert_eq!(grid_scale(0.0, 40, 2.0), 1.0);
        assert_eq!(grid_scale(f64::NAN, 40, 2.0), 1.0);
        assert_eq!(grid_scale(10.0, 41, 2.0), 2.0);
        assert_eq!(grid_scale(100.0, 41, 2.0), 0.4);
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("PANEL-A", 10), "PANEL-A");
        assert_eq!(truncate("/B1/3/ELEC/PANEL-A", 8), "/B1/3/E…");
        assert_eq!(pad("ab", 4), "ab  ");
    }

    #[test]
    fn frame_is_closed() {
        let mut buf = CharBuffer::new(4, 3);
        draw_frame(&mut buf, &BorderSet::PLAIN);
        assert_eq!(buf.lines(), vec!["┌──┐", "│  │", "└──┘"]);
    }
}
