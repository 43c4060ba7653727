#![forbid(unsafe_code)]

//! World-to-screen mapping.
//!
//! A [`Viewport`] is the world-space window currently mapped onto the
//! character grid:
//!
//! ```text
//! screen_x = round((world_x - viewport.x) * viewport.zoom)
//! screen_y = round((world_y - viewport.y) * viewport.zoom)
//! ```
//!
//! # Invariants
//!
//! 1. `zoom` is finite and `> 0`; every mutator clamps into a zoom range.
//! 2. `width`/`height` match the output buffer the viewport is rendered into
//!    (the layer manager resizes the buffer to enforce this).
//! 3. Coordinates resolving outside `[0, width) x [0, height)` are clipped,
//!    never reported as errors.

use crate::geometry::{Bounds, Point, Region};

/// Minimum zoom for any operation.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum zoom for manual zooming.
pub const MAX_ZOOM: f64 = 10.0;
/// Maximum zoom chosen by [`Viewport::fit_to_content`].
pub const MAX_FIT_ZOOM: f64 = 2.0;
/// Cells kept free on every side by [`Viewport::fit_to_content`].
pub const FIT_MARGIN: u16 = 2;

/// The active world-to-screen window.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// World x of the left screen column.
    pub x: f64,
    /// World y of the top screen row.
    pub y: f64,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
    /// Cells per world unit.
    pub zoom: f64,
    /// Floor currently shown (empty = unspecified).
    pub floor: String,
}

impl Viewport {
    /// Create a viewport at the world origin with zoom 1.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            zoom: 1.0,
            floor: String::new(),
        }
    }

    /// Set the floor selector (builder pattern).
    #[must_use]
    pub fn with_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = floor.into();
        self
    }

    /// Set the world origin (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the zoom (builder pattern), clamped to the manual zoom range.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Screen region covering the whole viewport.
    #[inline]
    pub const fn region(&self) -> Region {
        Region::from_size(self.width, self.height)
    }

    /// Project a world point to a (possibly off-screen) signed cell.
    #[inline]
    pub fn project(&self, p: Point) -> (i32, i32) {
        let sx = ((p.x - self.x) * self.zoom).round();
        let sy = ((p.y - self.y) * self.zoom).round();
        (sx as i32, sy as i32)
    }

    /// Project a world point to an on-screen cell, or `None` if clipped.
    pub fn world_to_screen(&self, p: Point) -> Option<(u16, u16)> {
        let (sx, sy) = self.project(p);
        if self.contains_cell(sx, sy) {
            Some((sx as u16, sy as u16))
        } else {
            None
        }
    }

    /// Map a screen cell back to the world point at its origin.
    pub fn screen_to_world(&self, sx: u16, sy: u16) -> Point {
        Point::new(
            f64::from(sx) / self.zoom + self.x,
            f64::from(sy) / self.zoom + self.y,
        )
    }

    /// Whether a signed cell lies inside `[0, width) x [0, height)`.
    #[inline]
    pub fn contains_cell(&self, sx: i32, sy: i32) -> bool {
        sx >= 0 && sy >= 0 && sx < i32::from(self.width) && sy < i32::from(self.height)
    }

    /// World-space rectangle currently visible.
    pub fn visible_bounds(&self) -> Bounds {
        Bounds::new(
            self.x,
            self.y,
            self.x + f64::from(self.width) / self.zoom,
            self.y + f64::from(self.height) / self.zoom,
        )
    }

    /// Screen region covered by world bounds, clipped to the viewport.
    pub fn region_for(&self, bounds: &Bounds) -> Option<Region> {
        let (x0, y0) = self.project(Point::new(bounds.min_x, bounds.min_y));
        let (x1, y1) = self.project(Point::new(bounds.max_x, bounds.max_y));
        Region::from_corners_clipped(x0, y0, x1, y1, self.width, self.height)
    }

    /// Shift the window by a world-space offset.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.x += dx;
            self.y += dy;
        }
    }

    /// Set zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Multiply zoom by `factor`, keeping the screen center fixed in world space.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let center = self.visible_bounds().center();
        self.set_zoom(self.zoom * factor);
        self.x = center.x - f64::from(self.width) / (2.0 * self.zoom);
        self.y = center.y - f64::from(self.height) / (2.0 * self.zoom);
    }

    /// Change the cell dimensions, keeping origin and zoom.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Compute a viewport that fits `content` into a `width x height` grid.
    ///
    /// Keeps [`FIT_MARGIN`] cells free on every side, centers the content,
    /// and clamps zoom to `[MIN_ZOOM, MAX_FIT_ZOOM]`. Zero-width or
    /// zero-height content is treated as one world unit on that axis.
    #[must_use]
    pub fn fit_to_content(content: &Bounds, width: u16, height: u16) -> Self {
        let margin = f64::from(FIT_MARGIN);
        let avail_w = (f64::from(width) - 2.0 * margin - 1.0).max(1.0);
        let avail_h = (f64::from(height) - 2.0 * margin - 1.0).max(1.0);

        let bw = if content.width() > 0.0 { content.width() } else { 1.0 };
        let bh = if content.height() > 0.0 { content.height() } else { 1.0 };

        let zoom = (avail_w / bw).min(avail_h / bh).clamp(MIN_ZOOM, MAX_FIT_ZOOM);

        let pad_x = ((avail_w - content.width() * zoom) / 2.0).max(0.0);
        let pad_y = ((avail_h - content.height() * zoom) / 2.0).max(0.0);

        Self {
            x: content.min_x - (margin + pad_x) / zoom,
            y: content.min_y - (margin + pad_y) / zoom,
            width,
            height,
            zoom,
            floor: String::new(),
        }
    }

    /// Refit this viewport to `content`, keeping dimensions and floor.
    pub fn fit(&mut self, content: &Bounds) {
        let fitted = Self::fit_to_content(content, self.width, self.height);
        self.x = fitted.x;
        self.y = fitted.y;
        self.zoom = fitted.zoom;
    }
}
