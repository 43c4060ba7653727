//! Property-based invariant tests for compositing and region merging.
//!
//! 1. `merge_regions` output is pairwise non-overlapping.
//! 2. `merge_regions` is idempotent.
//! 3. Every input cell is still covered after merging.
//! 4. Additive and Priority blending produce identical buffers.
//! 5. Overlay never lets a blank hide a glyph.

use bimview_core::geometry::Region;
use bimview_render::buffer::{BLANK, CharBuffer};
use bimview_render::compositor::{BlendMode, Compositor, categorize, merge_regions};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const W: u16 = 12;
const H: u16 = 6;

fn region() -> impl Strategy<Value = Region> {
    (0u16..60, 0u16..30, 0u16..12, 0u16..12).prop_map(|(x, y, w, h)| Region::new(x, y, w, h))
}

fn glyph() -> impl Strategy<Value = char> {
    prop::sample::select(vec![' ', ' ', ' ', '─', '│', '·', '░', '⊙', '▣', '●', '═', '→', '∙', '✗', '!'])
}

fn layer() -> impl Strategy<Value = CharBuffer> {
    proptest::collection::vec(glyph(), (W * H) as usize).prop_map(|cells| {
        let mut buf = CharBuffer::new(W, H);
        for (i, ch) in cells.into_iter().enumerate() {
            buf.set(i as u16 % W, i as u16 / W, ch);
        }
        buf
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Region merging
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merged_regions_are_disjoint(regions in proptest::collection::vec(region(), 0..20)) {
        let merged = merge_regions(&regions);
        for (i, a) in merged.iter().enumerate() {
            prop_assert!(!a.is_empty());
            for b in &merged[i + 1..] {
                prop_assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn merge_is_idempotent(regions in proptest::collection::vec(region(), 0..20)) {
        let once = merge_regions(&regions);
        let twice = merge_regions(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_preserves_coverage(regions in proptest::collection::vec(region(), 0..12)) {
        let merged = merge_regions(&regions);
        for r in regions.iter().filter(|r| !r.is_empty()) {
            for (x, y) in [(r.x, r.y), (r.right() - 1, r.bottom() - 1)] {
                prop_assert!(merged.iter().any(|m| m.contains(x, y)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Blending
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn additive_equals_priority(layers in proptest::collection::vec(layer(), 1..5)) {
        let mut additive = CharBuffer::new(W, H);
        let mut priority = CharBuffer::new(W, H);
        Compositor::new(BlendMode::Additive).composite(&layers, &mut additive);
        Compositor::new(BlendMode::Priority).composite(&layers, &mut priority);
        prop_assert_eq!(additive, priority);
    }

    #[test]
    fn priority_picks_highest_category(layers in proptest::collection::vec(layer(), 1..5)) {
        let mut out = CharBuffer::new(W, H);
        Compositor::new(BlendMode::Priority).composite(&layers, &mut out);
        for y in 0..H {
            for x in 0..W {
                let best = layers.iter().filter_map(|l| l.get(x, y)).map(categorize).max();
                prop_assert_eq!(out.get(x, y).map(categorize), best);
            }
        }
    }

    #[test]
    fn overlay_never_blanks_a_glyph(layers in proptest::collection::vec(layer(), 1..5)) {
        let mut out = CharBuffer::new(W, H);
        Compositor::new(BlendMode::Overlay).composite(&layers, &mut out);
        for y in 0..H {
            for x in 0..W {
                let any_glyph = layers.iter().any(|l| l.get(x, y) != Some(BLANK));
                prop_assert_eq!(out.get(x, y) != Some(BLANK), any_glyph);
            }
        }
    }
}
