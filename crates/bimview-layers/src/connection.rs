#![forbid(unsafe_code)]

//! Wiring and piping paths.

use bimview_core::geometry::{Bounds, Point};
use bimview_core::model::{Connection, ConnectionType, Equipment};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::compositor::{GlyphCategory, categorize};
use bimview_render::glyphs::{ConnectionStyle, LoadLevel};
use bimview_render::raster::{clip_segment, line_cells};

use crate::label::place_label;
use crate::layer::{Layer, LayerMeta, layer_meta_methods, padded_bounds, priority};

/// A connection resolved to a world-space polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPath {
    pub id: String,
    pub connection_type: ConnectionType,
    pub from_id: String,
    pub to_id: String,
    /// Source location, waypoints, target location.
    pub points: Vec<Point>,
    pub active: bool,
    pub load: f64,
    pub capacity: f64,
    pub label: Option<String>,
}

impl ConnectionPath {
    /// Resolve a connection against the equipment it joins.
    ///
    /// Returns `None` when either endpoint is unknown.
    pub fn resolve(connection: &Connection, equipment: &[Equipment]) -> Option<Self> {
        let location = |id: &str| equipment.iter().find(|e| e.id == id).map(|e| e.location);
        let from = location(&connection.from_id)?;
        let to = location(&connection.to_id)?;
        let mut points = Vec::with_capacity(connection.waypoints.len() + 2);
        points.push(from);
        points.extend(connection.waypoints.iter().copied());
        points.push(to);
        Some(Self {
            id: connection.id.clone(),
            connection_type: connection.connection_type,
            from_id: connection.from_id.clone(),
            to_id: connection.to_id.clone(),
            points,
            active: connection.active,
            load: connection.load,
            capacity: connection.capacity,
            label: None,
        })
    }

    /// Resolve every connection whose endpoints exist.
    pub fn resolve_all(connections: &[Connection], equipment: &[Equipment]) -> Vec<Self> {
        let paths: Vec<Self> = connections
            .iter()
            .filter_map(|c| Self::resolve(c, equipment))
            .collect();
        if paths.len() < connections.len() {
            tracing::debug!(
                dropped = connections.len() - paths.len(),
                "connections with unknown endpoints skipped"
            );
        }
        paths
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// `load / capacity`, or 0 for zero capacity.
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0.0 {
            self.load / self.capacity
        } else {
            0.0
        }
    }

    #[inline]
    pub fn load_level(&self) -> LoadLevel {
        LoadLevel::classify(self.load, self.capacity, self.active)
    }

    /// Line glyph for the current load.
    pub fn line_glyph(&self) -> char {
        ConnectionStyle::for_type(self.connection_type).line(self.load_level())
    }
}

/// Write `ch` unless the cell already shows equipment or a status alert.
fn put_preserving_equipment(buf: &mut CharBuffer, x: i32, y: i32, ch: char) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(existing) = buf.get(x as u16, y as u16) else {
        return;
    };
    if !matches!(categorize(existing), GlyphCategory::Equipment | GlyphCategory::Alert) {
        buf.set(x as u16, y as u16, ch);
    }
}

/// Draws connection polylines with junctions at every vertex.
///
/// Equipment and status glyphs already in the buffer are left in place, so
/// a path ending at a device never hides the device.
#[derive(Debug, Clone)]
pub struct ConnectionLayer {
    meta: LayerMeta,
    paths: Vec<ConnectionPath>,
    show_labels: bool,
}

impl ConnectionLayer {
    pub const NAME: &'static str = "connections";

    pub fn new(paths: Vec<ConnectionPath>) -> Self {
        Self {
            meta: LayerMeta::new(Self::NAME, priority::CONNECTIONS),
            paths,
            show_labels: false,
        }
    }

    #[must_use]
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    pub fn paths(&self) -> &[ConnectionPath] {
        &self.paths
    }

    /// Update live load for a path. Returns `false` for unknown IDs.
    pub fn set_load(&mut self, id: &str, load: f64, active: bool) -> bool {
        match self.paths.iter_mut().find(|p| p.id == id) {
            Some(path) => {
                path.load = load;
                path.active = active;
                true
            }
            None => false,
        }
    }
}

impl Layer for ConnectionLayer {
    layer_meta_methods!();

    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        for path in &self.paths {
            let glyph = path.line_glyph();
            let cells: Vec<(i32, i32)> = path.points.iter().map(|p| viewport.project(*p)).collect();
            for seg in cells.windows(2) {
                let Some((a, b)) = clip_segment(seg[0], seg[1], buf.width(), buf.height()) else {
                    continue;
                };
                for (x, y) in line_cells(a.0, a.1, b.0, b.1) {
                    put_preserving_equipment(buf, x, y, glyph);
                }
            }
            let junction = ConnectionStyle::for_type(path.connection_type).junction;
            for &(x, y) in &cells {
                put_preserving_equipment(buf, x, y, junction);
            }
        }

        if self.show_labels {
            for path in &self.paths {
                let (Some(label), Some(&mid)) =
                    (path.label.as_deref(), path.points.get(path.points.len() / 2))
                else {
                    continue;
                };
                let (x, y) = viewport.project(mid);
                place_label(buf, x, y, label);
            }
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        padded_bounds(self.paths.iter().flat_map(|p| p.points.iter()), 0.0)
    }
}
