#![forbid(unsafe_code)]

//! Energy-flow simulation and its animated overlay.
//!
//! The simulation walks the electrical network downstream (`from` → `to`)
//! from every working source. Reached equipment is energised (level 1.0);
//! failed, offline, or unreachable equipment sits at 0.0. Each edge carries
//! either its measured load or, when none is reported, one unit of demand
//! per energised consumer below it.

use std::collections::VecDeque;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use bimview_core::geometry::{Bounds, Point};
use bimview_core::model::{Connection, ConnectionType, Equipment, EquipmentStatus};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::raster::{Octant, draw_line_with, flow_glyph};

use crate::layer::{Layer, LayerMeta, layer_meta_methods, padded_bounds, priority};

/// Equipment type substrings that mark a power source.
pub const SOURCE_KEYWORDS: &[&str] = &["panel", "transformer", "generator", "ups", "main"];

/// Demand drawn by one energised consumer when no load is reported.
pub const UNIT_DEMAND: f64 = 1.0;

/// Marker for a consumer with no supply.
pub const UNPOWERED_GLYPH: char = '⊘';

/// Whether an equipment type is a power source.
pub fn is_source(equipment_type: &str) -> bool {
    let t = equipment_type.to_ascii_lowercase();
    SOURCE_KEYWORDS.iter().any(|k| t.contains(k))
}

/// Cell distance between two screen positions, in whatever range they span.
fn chebyshev(a: (i32, i32), b: (i32, i32)) -> u64 {
    let dx = (i64::from(b.0) - i64::from(a.0)).unsigned_abs();
    let dy = (i64::from(b.1) - i64::from(a.1)).unsigned_abs();
    dx.max(dy)
}

fn can_conduct(status: EquipmentStatus) -> bool {
    !matches!(status, EquipmentStatus::Failed | EquipmentStatus::Offline)
}

/// Simulated flow on one electrical connection.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFlow {
    pub connection_id: String,
    pub from_id: String,
    pub to_id: String,
    pub flow: f64,
    /// `flow / capacity`; 0 when capacity is unknown.
    pub utilization: f64,
    pub energized: bool,
}

impl EdgeFlow {
    /// Animation intensity in `[0, 1]`.
    pub fn intensity(&self) -> f64 {
        if !self.energized {
            0.0
        } else if self.utilization > 0.0 {
            self.utilization.min(1.0)
        } else {
            0.5
        }
    }
}

/// Result of one simulation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyState {
    pub node_levels: AHashMap<String, f64>,
    pub edges: Vec<EdgeFlow>,
    pub sources: Vec<String>,
}

impl EnergyState {
    /// Energy level of an item; unknown IDs are 0.
    pub fn level(&self, id: &str) -> f64 {
        self.node_levels.get(id).copied().unwrap_or(0.0)
    }

    pub fn energized_count(&self) -> usize {
        self.node_levels.values().filter(|&&l| l > 0.0).count()
    }

    pub fn edge(&self, connection_id: &str) -> Option<&EdgeFlow> {
        self.edges.iter().find(|e| e.connection_id == connection_id)
    }
}

/// Run one simulation pass.
pub fn simulate(equipment: &[Equipment], connections: &[Connection]) -> EnergyState {
    let status: AHashMap<&str, EquipmentStatus> =
        equipment.iter().map(|e| (e.id.as_str(), e.status)).collect();
    let electrical: Vec<&Connection> = connections
        .iter()
        .filter(|c| c.connection_type == ConnectionType::Electrical)
        .collect();

    let mut downstream: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for c in &electrical {
        downstream.entry(c.from_id.as_str()).or_default().push(c.to_id.as_str());
    }

    let sources: Vec<&str> = equipment
        .iter()
        .filter(|e| can_conduct(e.status) && is_source(&e.equipment_type))
        .map(|e| e.id.as_str())
        .collect();

    // BFS from all sources; `order` is the visit order, `parent` the tree.
    let mut parent: AHashMap<&str, &str> = AHashMap::new();
    let mut reached: AHashSet<&str> = sources.iter().copied().collect();
    let mut order: Vec<&str> = Vec::new();
    let mut queue: VecDeque<&str> = sources.iter().copied().collect();
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &next in downstream.get(node).map(Vec::as_slice).unwrap_or_default() {
            let conducts = status.get(next).is_some_and(|s| can_conduct(*s));
            if conducts && reached.insert(next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    // Downstream demand per node, accumulated leaves-first.
    let source_set: AHashSet<&str> = sources.iter().copied().collect();
    let mut demand: AHashMap<&str, f64> = order
        .iter()
        .map(|&n| (n, if source_set.contains(n) { 0.0 } else { UNIT_DEMAND }))
        .collect();
    for &node in order.iter().rev() {
        if let Some(&up) = parent.get(node) {
            let d = demand.get(node).copied().unwrap_or(0.0);
            *demand.entry(up).or_insert(0.0) += d;
        }
    }

    let edges = electrical
        .iter()
        .map(|c| {
            let tree_edge = parent.get(c.to_id.as_str()) == Some(&c.from_id.as_str());
            let energized = reached.contains(c.from_id.as_str()) && reached.contains(c.to_id.as_str());
            let flow = if !energized {
                0.0
            } else if c.load > 0.0 {
                c.load
            } else if tree_edge {
                demand.get(c.to_id.as_str()).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            EdgeFlow {
                connection_id: c.id.clone(),
                from_id: c.from_id.clone(),
                to_id: c.to_id.clone(),
                flow,
                utilization: if c.capacity > 0.0 { flow / c.capacity } else { 0.0 },
                energized,
            }
        })
        .collect();

    let node_levels = equipment
        .iter()
        .map(|e| {
            let level = if reached.contains(e.id.as_str()) { 1.0 } else { 0.0 };
            (e.id.clone(), level)
        })
        .collect();

    EnergyState {
        node_levels,
        edges,
        sources: sources.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Animated energy-flow overlay.
///
/// The simulation is recomputed every `recompute_every` ticks; the
/// animation frame advances on every tick.
#[derive(Debug, Clone)]
pub struct EnergyLayer {
    meta: LayerMeta,
    equipment: Vec<Equipment>,
    connections: Vec<Connection>,
    state: EnergyState,
    frame: u64,
    ticks_since_recompute: u64,
    recompute_every: u64,
}

impl EnergyLayer {
    pub const NAME: &'static str = "energy";

    pub fn new(equipment: Vec<Equipment>, connections: Vec<Connection>, recompute_every: u64) -> Self {
        let state = simulate(&equipment, &connections);
        Self {
            meta: LayerMeta::new(Self::NAME, priority::ENERGY),
            equipment,
            connections,
            state,
            frame: 0,
            ticks_since_recompute: 0,
            recompute_every: recompute_every.max(1),
        }
    }

    pub fn state(&self) -> &EnergyState {
        &self.state
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Change an item's status. Takes effect at the next recompute.
    pub fn set_status(&mut self, id: &str, status: EquipmentStatus) -> bool {
        match self.equipment.iter_mut().find(|e| e.id == id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Recompute the simulation now.
    pub fn recompute(&mut self) {
        self.state = simulate(&self.equipment, &self.connections);
        self.ticks_since_recompute = 0;
        tracing::debug!(
            energized = self.state.energized_count(),
            sources = self.state.sources.len(),
            "energy simulation recomputed"
        );
    }

    fn location(&self, id: &str) -> Option<Point> {
        self.equipment.iter().find(|e| e.id == id).map(|e| e.location)
    }

    fn path_points(&self, c: &Connection) -> Option<Vec<Point>> {
        let mut points = vec![self.location(&c.from_id)?];
        points.extend(c.waypoints.iter().copied());
        points.push(self.location(&c.to_id)?);
        Some(points)
    }
}

impl Layer for EnergyLayer {
    layer_meta_methods!();

    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        for c in self.connections.iter().filter(|c| c.connection_type == ConnectionType::Electrical) {
            let Some(edge) = self.state.edge(&c.id).filter(|e| e.energized) else {
                continue;
            };
            let Some(points) = self.path_points(c) else {
                continue;
            };
            let intensity = edge.intensity();
            let frame = self.frame;
            for seg in points.windows(2) {
                let (a, b) = (viewport.project(seg[0]), viewport.project(seg[1]));
                let octant = Octant::from_vector(
                    f64::from(b.0) - f64::from(a.0),
                    f64::from(b.1) - f64::from(a.1),
                );
                // Vertices belong to equipment and junction glyphs. The phase is
                // the distance left to `b`, so clipping does not shift it.
                draw_line_with(buf, a, b, |_, x, y| {
                    if (x, y) == a || (x, y) == b {
                        return None;
                    }
                    let to_end = chebyshev((x, y), b);
                    Some(flow_glyph(octant, intensity, frame.wrapping_add(to_end)))
                });
            }
        }

        let wired: AHashSet<&str> = self
            .connections
            .iter()
            .filter(|c| c.connection_type == ConnectionType::Electrical)
            .flat_map(|c| [c.from_id.as_str(), c.to_id.as_str()])
            .collect();
        for item in &self.equipment {
            if wired.contains(item.id.as_str())
                && can_conduct(item.status)
                && self.state.level(&item.id) <= 0.0
            {
                let (x, y) = viewport.project(item.location);
                buf.set_signed(x, y, UNPOWERED_GLYPH);
            }
        }
    }

    fn update(&mut self, _dt: Duration) {
        self.frame = self.frame.wrapping_add(1);
        self.ticks_since_recompute += 1;
        if self.ticks_since_recompute >= self.recompute_every {
            self.recompute();
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        let points: Vec<Point> = self
            .connections
            .iter()
            .filter(|c| c.connection_type == ConnectionType::Electrical)
            .filter_map(|c| self.path_points(c))
            .flatten()
            .collect();
        padded_bounds(points.iter(), 0.0)
    }

    fn is_animated(&self) -> bool {
        true
    }
}
