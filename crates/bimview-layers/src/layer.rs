#![forbid(unsafe_code)]

//! The [`Layer`] capability and standard priorities.
//!
//! A layer is a flat struct that owns its domain data and draws it into the
//! shared [`CharBuffer`] through a [`Viewport`]. Layers never look at each
//! other; ordering and visibility are the manager's concern.

use std::any::Any;
use std::time::Duration;

use bimview_core::geometry::Bounds;
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;

/// Standard layer priorities (lower renders first).
pub mod priority {
    pub const BACKGROUND: i32 = 0;
    pub const STRUCTURE: i32 = 10;
    pub const EQUIPMENT: i32 = 20;
    pub const CONNECTIONS: i32 = 30;
    pub const ENERGY: i32 = 35;
    pub const FAILURE: i32 = 40;
    pub const PARTICLES: i32 = 60;
    pub const UI: i32 = 100;
}

/// An independently toggleable rendering concern.
pub trait Layer: Send + Sync {
    /// Unique registry key.
    fn name(&self) -> &str;

    /// Z-order; lower renders first and is overwritten by higher.
    fn priority(&self) -> i32;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Draw into `buf`. Cells that project off-screen are skipped.
    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport);

    /// Advance animation or simulation state by one tick.
    fn update(&mut self, _dt: Duration) {}

    /// World-space extent of everything this layer draws, if any.
    fn bounds(&self) -> Option<Bounds>;

    /// Whether `update` can change the rendered output.
    fn is_animated(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Name, priority, and visibility shared by every concrete layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMeta {
    pub name: String,
    pub priority: i32,
    pub visible: bool,
}

impl LayerMeta {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            visible: true,
        }
    }
}

/// Implements the bookkeeping half of [`Layer`] by delegating to a `meta` field.
macro_rules! layer_meta_methods {
    () => {
        fn name(&self) -> &str {
            &self.meta.name
        }

        fn priority(&self) -> i32 {
            self.meta.priority
        }

        fn is_visible(&self) -> bool {
            self.meta.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.meta.visible = visible;
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

pub(crate) use layer_meta_methods;

/// Bounds of a set of points, expanded by `pad` world units.
pub(crate) fn padded_bounds<'a>(
    points: impl IntoIterator<Item = &'a bimview_core::geometry::Point>,
    pad: f64,
) -> Option<Bounds> {
    Bounds::from_points(points).map(|b| if pad > 0.0 { b.expand(pad) } else { b })
}
