#![forbid(unsafe_code)]

//! Status-aware equipment glyphs with optional highlight and labels.

use ahash::AHashSet;
use bimview_core::geometry::Bounds;
use bimview_core::model::{Equipment, EquipmentStatus};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::glyphs::resolve_equipment_glyph;

use crate::label::place_label;
use crate::layer::{Layer, LayerMeta, layer_meta_methods, padded_bounds, priority};

/// Brackets drawn either side of highlighted equipment.
pub const HIGHLIGHT_BRACKETS: (char, char) = ('[', ']');

/// Draws one glyph per piece of equipment.
#[derive(Debug, Clone)]
pub struct EquipmentLayer {
    meta: LayerMeta,
    equipment: Vec<Equipment>,
    highlighted: AHashSet<String>,
    show_labels: bool,
}

impl EquipmentLayer {
    pub const NAME: &'static str = "equipment";

    pub fn new(equipment: Vec<Equipment>) -> Self {
        Self {
            meta: LayerMeta::new(Self::NAME, priority::EQUIPMENT),
            equipment,
            highlighted: AHashSet::new(),
            show_labels: false,
        }
    }

    #[must_use]
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    pub fn set_labels(&mut self, show: bool) {
        self.show_labels = show;
    }

    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// Highlight an item. Returns `false` for unknown IDs.
    pub fn highlight(&mut self, id: &str) -> bool {
        if self.equipment.iter().any(|e| e.id == id) {
            self.highlighted.insert(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.contains(id)
    }

    /// Change the status of an item. Returns `false` for unknown IDs.
    pub fn set_status(&mut self, id: &str, status: EquipmentStatus) -> bool {
        match self.equipment.iter_mut().find(|e| e.id == id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }
}

impl Layer for EquipmentLayer {
    layer_meta_methods!();

    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        let mut on_screen = Vec::with_capacity(self.equipment.len());
        for item in &self.equipment {
            let (x, y) = viewport.project(item.location);
            if !viewport.contains_cell(x, y) {
                continue;
            }
            buf.set_signed(x, y, resolve_equipment_glyph(&item.equipment_type, item.status));
            if self.highlighted.contains(&item.id) {
                let (open, close) = HIGHLIGHT_BRACKETS;
                buf.set_signed(x - 1, y, open);
                buf.set_signed(x + 1, y, close);
            }
            on_screen.push((x, y, item));
        }

        // Labels go last so they never cover a glyph.
        if self.show_labels {
            for (x, y, item) in on_screen {
                place_label(buf, x, y, &item.name);
            }
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        padded_bounds(self.equipment.iter().map(|e| &e.location), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use bimview_core::geometry::Point;
    use bimview_render::glyphs::{DEGRADED_GLYPH, FAILED_GLYPH};

    use super::*;

    fn outlet(id: &str, x: f64, y: f64) -> Equipment {
        Equipment::new(id, format!("Outlet {id}"), "outlet", Point::new(x, y))
    }

    #[test]
    fn glyph_lands_on_projected_cell() {
        let layer = EquipmentLayer::new(vec![outlet("o1", 5.0, 4.0)]);
        let mut buf = CharBuffer::new(20, 10);
        layer.render(&mut buf, &Viewport::new(20, 10));
        assert_eq!(buf.get(5, 4), Some('⊙'));
    }

    #[test]
    fn status_overrides_type() {
        let layer = EquipmentLayer::new(vec![
            outlet("a", 1.0, 1.0).with_status(EquipmentStatus::Failed),
            outlet("b", 3.0, 1.0).with_status(EquipmentStatus::Degraded),
        ]);
        let mut buf = CharBuffer::new(10, 3);
        layer.render(&mut buf, &Viewport::new(10, 3));
        assert_eq!(buf.get(1, 1), Some(FAILED_GLYPH));
        assert_eq!(buf.get(3, 1), Some(DEGRADED_GLYPH));
    }

    #[test]
    fn highlight_and_label() {
        let mut layer = EquipmentLayer::new(vec![outlet("o1", 5.0, 2.0)]).with_labels(true);
        assert!(layer.highlight("o1"));
        assert!(!layer.highlight("missing"));
        let mut buf = CharBuffer::new(20, 5);
        layer.render(&mut buf, &Viewport::new(20, 5));
        assert_eq!(buf.line(2), "    [⊙]");
        assert_eq!(buf.line(3), " Outlet o1");
    }

    #[test]
    fn off_screen_equipment_is_skipped() {
        let layer = EquipmentLayer::new(vec![outlet("far", 500.0, -3.0)]).with_labels(true);
        let mut buf = CharBuffer::new(10, 3);
        layer.render(&mut buf, &Viewport::new(10, 3));
        assert_eq!(buf, CharBuffer::new(10, 3));
    }
}
