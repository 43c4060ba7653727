#![forbid(unsafe_code)]

//! Render kernel: character buffers, rasterization, glyph tables, and compositing.
//!
//! # Role in bimview
//! `bimview-render` owns everything between "a world-space primitive was
//! projected to cells" and "a string is printed". Layers and views draw into
//! a [`CharBuffer`](buffer::CharBuffer) with the primitives here and never
//! touch terminal state.
//!
//! # Primary responsibilities
//! - **CharBuffer**: fixed grid with silent clipping and wide-glyph handling.
//! - **Raster**: symmetric Bresenham lines, banded zone fills, flow glyphs.
//! - **Glyphs**: immutable equipment/status/connection/border tables.
//! - **Compositor**: blend modes, glyph categories, region merging.
//! - **Dirty**: region tracking for incremental redraw.
//! - **Ansi**: optional color pass over finished text.

pub mod ansi;
pub mod buffer;
pub mod compositor;
pub mod dirty;
pub mod glyphs;
pub mod raster;

pub use buffer::{BLANK, CharBuffer};
pub use compositor::{BlendMode, Compositor, GlyphCategory, categorize, merge_regions};
pub use dirty::DirtyTracker;
pub use glyphs::{BorderSet, ConnectionStyle, Edges, LoadLevel};
pub use raster::{BandGlyphs, Octant, draw_line, fill_zone, flow_glyph, line_cells};
