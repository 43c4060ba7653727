#![forbid(unsafe_code)]

//! Rooms and walls.

use bimview_core::geometry::{Bounds, Point};
use bimview_core::model::Room;
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::glyphs::{BorderSet, Edges, FLOOR_GLYPH};
use unicode_width::UnicodeWidthStr;

use crate::layer::{Layer, LayerMeta, layer_meta_methods, priority};

/// Draws room rectangles with box-drawing borders and a floor fill.
#[derive(Debug, Clone)]
pub struct StructureLayer {
    meta: LayerMeta,
    rooms: Vec<Room>,
    border: BorderSet,
    show_names: bool,
}

impl StructureLayer {
    pub const NAME: &'static str = "structure";

    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            meta: LayerMeta::new(Self::NAME, priority::STRUCTURE),
            rooms,
            border: BorderSet::PLAIN,
            show_names: true,
        }
    }

    #[must_use]
    pub fn with_border(mut self, border: BorderSet) -> Self {
        self.border = border;
        self
    }

    #[must_use]
    pub fn with_names(mut self, show: bool) -> Self {
        self.show_names = show;
        self
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn render_room(&self, room: &Room, buf: &mut CharBuffer, viewport: &Viewport) {
        let (x0, y0) = viewport.project(Point::new(room.bounds.min_x, room.bounds.min_y));
        let (x1, y1) = viewport.project(Point::new(room.bounds.max_x, room.bounds.max_y));
        let w = i32::from(buf.width());
        let h = i32::from(buf.height());

        for y in y0.max(0)..=y1.min(h - 1) {
            for x in x0.max(0)..=x1.min(w - 1) {
                let ch = self
                    .border
                    .glyph_for(Edges::at(x, y, x0, y0, x1, y1))
                    .unwrap_or(FLOOR_GLYPH);
                buf.set_signed(x, y, ch);
            }
        }

        // Name on the first interior row, centered; omitted when it does not fit.
        // Saturated corners carry no real position, so such rooms go unnamed.
        if !self.show_names || [x0, y0, x1, y1].iter().any(|&c| c == i32::MIN || c == i32::MAX) {
            return;
        }
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        if y1 - y0 < 2 {
            return;
        }
        let inner = x1 - x0 - 1;
        let len = room.name.width() as i64;
        if len == 0 || len > inner {
            return;
        }
        let (Ok(left), Ok(row)) = (i32::try_from(x0 + 1 + (inner - len) / 2), i32::try_from(y0 + 1)) else {
            return;
        };
        buf.print_text(left, row, &room.name);
    }
}

impl Layer for StructureLayer {
    layer_meta_methods!();

    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        for room in &self.rooms {
            self.render_room(room, buf, viewport);
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        self.rooms.iter().map(|r| r.bounds).reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> Room {
        Room::new("r1", "Office", Bounds::new(0.0, 0.0, 10.0, 8.0))
    }

    #[test]
    fn draws_closed_box_with_name() {
        let layer = StructureLayer::new(vec![office()]);
        let mut buf = CharBuffer::new(20, 10);
        layer.render(&mut buf, &Viewport::new(20, 10));
        assert_eq!(buf.get(0, 0), Some('┌'));
        assert_eq!(buf.get(10, 0), Some('┐'));
        assert_eq!(buf.get(0, 8), Some('└'));
        assert_eq!(buf.get(10, 8), Some('┘'));
        assert_eq!(buf.get(5, 0), Some('─'));
        assert_eq!(buf.get(0, 4), Some('│'));
        assert_eq!(buf.get(5, 5), Some(FLOOR_GLYPH));
        assert_eq!(buf.line(1), "│·Office··│");
    }

    #[test]
    fn long_name_is_omitted_not_truncated() {
        let room = Room::new("r", "Mechanical Room", Bounds::new(0.0, 0.0, 6.0, 4.0));
        let layer = StructureLayer::new(vec![room]);
        let mut buf = CharBuffer::new(10, 6);
        layer.render(&mut buf, &Viewport::new(10, 6));
        assert_eq!(buf.line(1), "│·····│");
    }

    #[test]
    fn partially_visible_room_is_clipped() {
        let layer = StructureLayer::new(vec![office()]);
        let mut buf = CharBuffer::new(6, 4);
        let viewport = Viewport::new(6, 4).with_origin(5.0, 5.0);
        layer.render(&mut buf, &viewport);
        assert_eq!(buf.get(5, 3), Some('┘'));
        assert_eq!(buf.get(0, 0), Some(FLOOR_GLYPH));
    }

    #[test]
    fn huge_room_is_clipped_without_overflow() {
        let room = Room::new("r", "Hall", Bounds::new(-1e12, -1e12, 1e12, 1e12));
        let layer = StructureLayer::new(vec![room]);
        let mut buf = CharBuffer::new(20, 10);
        layer.render(&mut buf, &Viewport::new(20, 10));
        assert_eq!(buf.count(FLOOR_GLYPH), 200);
        assert!(!buf.line(1).contains("Hall"));
    }

    #[test]
    fn room_reaching_far_right_keeps_its_left_wall() {
        let room = Room::new("r", "Wing", Bounds::new(2.0, 1.0, 1e12, 6.0));
        let layer = StructureLayer::new(vec![room]);
        let mut buf = CharBuffer::new(12, 8);
        layer.render(&mut buf, &Viewport::new(12, 8));
        assert_eq!(buf.get(2, 1), Some('┌'));
        assert_eq!(buf.get(2, 6), Some('└'));
        assert_eq!(buf.get(11, 1), Some('─'));
        assert_eq!(buf.get(11, 3), Some(FLOOR_GLYPH));
    }

    #[test]
    fn bounds_cover_all_rooms() {
        let layer = StructureLayer::new(vec![
            office(),
            Room::new("r2", "Lab", Bounds::new(12.0, 2.0, 20.0, 9.0)),
        ]);
        assert_eq!(layer.bounds(), Some(Bounds::new(0.0, 0.0, 20.0, 9.0)));
        assert_eq!(StructureLayer::new(Vec::new()).bounds(), None);
    }
}
