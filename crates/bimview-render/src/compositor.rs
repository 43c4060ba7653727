#![forbid(unsafe_code)]

//! Buffer compositing and region merging.
//!
//! The layer manager normally renders every layer straight into one shared
//! buffer. The [`Compositor`] serves the direct-composite path, where each
//! layer owns a buffer and the results are blended under a [`BlendMode`].
//!
//! # Blend policies
//!
//! | Mode | Rule |
//! |------|------|
//! | `Replace` | later buffer overwrites unconditionally |
//! | `Overlay` | blank never overwrites non-blank |
//! | `Additive` | layer-by-layer; higher [`GlyphCategory`] wins, ties go to the later layer |
//! | `Priority` | same decision as `Additive`, decided per cell in one pass |

use bimview_core::geometry::Region;

use crate::buffer::{BLANK, CONTINUATION, CharBuffer};

/// Category of a glyph. The derived order is the blend priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlyphCategory {
    Blank,
    Structure,
    Fill,
    Equipment,
    Electrical,
    Particle,
    Alert,
}

/// Category of a character.
///
/// Box-drawing characters are structure; unlisted glyphs (labels, type
/// symbols) rank as equipment.
pub fn categorize(ch: char) -> GlyphCategory {
    match ch {
        BLANK | '\0' => GlyphCategory::Blank,
        '✗' | '✖' | '!' | '△' | 'ϟ' | '✱' | '✹' | '✕' | '✦' | '▲' => GlyphCategory::Alert,
        '→' | '↘' | '↓' | '↙' | '←' | '↖' | '↑' | '↗' | '∙' => GlyphCategory::Particle,
        '●' | '◉' | '○' | '◌' | '◍' | '◆' | '◦' | '▬' | '≈' | '~' => GlyphCategory::Electrical,
        '·' | '░' | '▒' | '▓' | '█' => GlyphCategory::Fill,
        '\u{2500}'..='\u{257F}' => GlyphCategory::Structure,
        _ => GlyphCategory::Equipment,
    }
}

/// How two buffers combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    Replace,
    #[default]
    Overlay,
    Additive,
    Priority,
}

/// Blend one incoming glyph onto an existing one.
#[inline]
pub fn blend_cell(mode: BlendMode, dst: char, src: char) -> char {
    match mode {
        BlendMode::Replace => src,
        BlendMode::Overlay => {
            if src == BLANK {
                dst
            } else {
                src
            }
        }
        BlendMode::Additive | BlendMode::Priority => {
            if categorize(src) >= categorize(dst) && src != BLANK {
                src
            } else {
                dst
            }
        }
    }
}

/// Blends ordered layer buffers into one output buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor {
    mode: BlendMode,
}

impl Compositor {
    #[must_use]
    pub const fn new(mode: BlendMode) -> Self {
        Self { mode }
    }

    #[inline]
    pub const fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Composite `layers` (lowest priority first) into `out`.
    ///
    /// `out` is cleared first. Layers whose dimensions differ from `out`
    /// are skipped.
    pub fn composite(&self, layers: &[CharBuffer], out: &mut CharBuffer) {
        out.clear();
        let usable: Vec<&CharBuffer> = layers
            .iter()
            .filter(|l| l.width() == out.width() && l.height() == out.height())
            .collect();
        #[cfg(feature = "tracing")]
        if usable.len() != layers.len() {
            tracing::warn!(
                skipped = layers.len() - usable.len(),
                "layer buffer size differs from output; skipping"
            );
        }

        match self.mode {
            BlendMode::Priority => Self::composite_single_pass(&usable, out),
            mode => {
                for layer in usable {
                    for y in 0..out.height() {
                        for x in 0..out.width() {
                            let src = layer.get(x, y).unwrap_or(BLANK);
                            // Trailing half of a wide glyph; written with its head.
                            if src == CONTINUATION {
                                continue;
                            }
                            let dst = out.get(x, y).unwrap_or(BLANK);
                            let ch = blend_cell(mode, dst, src);
                            if ch != dst {
                                out.set(x, y, ch);
                            }
                        }
                    }
                }
            }
        }
    }

    fn composite_single_pass(layers: &[&CharBuffer], out: &mut CharBuffer) {
        for y in 0..out.height() {
            for x in 0..out.width() {
                let winner = layers
                    .iter()
                    .filter_map(|l| l.get(x, y))
                    .filter(|&c| c != BLANK && c != CONTINUATION)
                    .enumerate()
                    .max_by_key(|&(i, c)| (categorize(c), i))
                    .map(|(_, c)| c);
                if let Some(ch) = winner {
                    out.set(x, y, ch);
                }
            }
        }
    }
}

/// Merge overlapping regions until no two overlap.
///
/// Repeatedly replaces any overlapping pair with its bounding box. Empty
/// regions are dropped. O(n²) per pass; region counts stay small.
pub fn merge_regions(regions: &[Region]) -> Vec<Region> {
    let mut merged: Vec<Region> = regions.iter().copied().filter(|r| !r.is_empty()).collect();
    loop {
        let mut changed = false;
        'outer: for i in 0..merged.len() {
            for j in (i + 1)..merged.len() {
                if merged[i].overlaps(&merged[j]) {
                    let other = merged.swap_remove(j);
                    merged[i] = merged[i].union(&other);
                    changed = true;
                    break 'outer;
                }
            }
        }
        if !changed {
            return merged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf_with(width: u16, cells: &[(u16, u16, char)]) -> CharBuffer {
        let mut b = CharBuffer::new(width, 1);
        for &(x, y, c) in cells {
            b.set(x, y, c);
        }
        b
    }

    #[test]
    fn category_order() {
        assert!(categorize('─') < categorize('·'));
        assert!(categorize('·') < categorize('⊙'));
        assert!(categorize('⊙') < categorize('●'));
        assert!(categorize('●') < categorize('→'));
        assert!(categorize('→') < categorize('✗'));
        assert_eq!(categorize(' '), GlyphCategory::Blank);
        assert_eq!(categorize('A'), GlyphCategory::Equipment);
    }

    #[test]
    fn replace_overwrites_with_blank() {
        let lower = buf_with(3, &[(0, 0, 'a'), (1, 0, 'b')]);
        let upper = buf_with(3, &[(1, 0, 'c')]);
        let mut out = CharBuffer::new(3, 1);
        Compositor::new(BlendMode::Replace).composite(&[lower, upper], &mut out);
        assert_eq!(out.line(0), " c");
    }

    #[test]
    fn overlay_keeps_lower_under_blank() {
        let lower = buf_with(3, &[(0, 0, 'a'), (1, 0, 'b')]);
        let upper = buf_with(3, &[(1, 0, 'c')]);
        let mut out = CharBuffer::new(3, 1);
        Compositor::new(BlendMode::Overlay).composite(&[lower, upper], &mut out);
        assert_eq!(out.line(0), "ac");
    }

    #[test]
    fn additive_keeps_alert_under_structure() {
        let lower = buf_with(2, &[(0, 0, '✗'), (1, 0, '─')]);
        let upper = buf_with(2, &[(0, 0, '─'), (1, 0, '●')]);
        let mut out = CharBuffer::new(2, 1);
        Compositor::new(BlendMode::Additive).composite(&[lower.clone(), upper.clone()], &mut out);
        assert_eq!(out.line(0), "✗●");

        let mut single = CharBuffer::new(2, 1);
        Compositor::new(BlendMode::Priority).composite(&[lower, upper], &mut single);
        assert_eq!(single, out);
    }

    #[test]
    fn mismatched_layers_are_skipped() {
        let wrong = CharBuffer::new(5, 5);
        let right = buf_with(2, &[(0, 0, 'x')]);
        let mut out = CharBuffer::new(2, 1);
        Compositor::new(BlendMode::Overlay).composite(&[wrong, right], &mut out);
        assert_eq!(out.line(0), "x");
    }

    #[test]
    fn merge_chains_transitively() {
        let regions = [
            Region::new(0, 0, 2, 2),
            Region::new(10, 10, 2, 2),
            Region::new(1, 1, 2, 2),
            Region::new(2, 2, 2, 2),
            Region::new(0, 0, 0, 5),
        ];
        let mut merged = merge_regions(&regions);
        merged.sort_by_key(|r| (r.x, r.y));
        assert_eq!(merged, vec![Region::new(0, 0, 4, 4), Region::new(10, 10, 2, 2)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let regions = [
            Region::new(0, 0, 3, 3),
            Region::new(2, 2, 3, 3),
            Region::new(8, 0, 1, 1),
        ];
        let once = merge_regions(&regions);
        assert_eq!(merge_regions(&once), once);
    }
}
