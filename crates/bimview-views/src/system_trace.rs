#![forbid(unsafe_code)]

//! System tracing on one floor plan.
//!
//! The output is the layered floor-plan map followed by text sections:
//! per-system summaries (or one system's connections), energy reach, an
//! optional connection trace, cascading-failure analysis, and a fault list
//! that is always present.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use bimview_core::config::RendererConfig;
use bimview_core::model::{Connection, Equipment, EquipmentStatus, FloorPlan};
use bimview_layers::{ConnectionPath, FailureEvent, FloorPlanView, Severity};
use bimview_render::glyphs::resolve_equipment_glyph;

use crate::error::RenderError;
use crate::request::Filters;
use crate::system::SystemType;
use crate::text::{percent, rule};

/// Severity assumed for equipment that arrives already failed.
pub const OBSERVED_FAILURE_SEVERITY: Severity = Severity::Major;

/// One node reached by a connection trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceHop<'a> {
    pub depth: usize,
    pub equipment: &'a Equipment,
    /// Connection used to reach this node; `None` for the start.
    pub via: Option<&'a Connection>,
}

/// Breadth-first walk of the undirected connection graph from `start`.
///
/// Neighbours are visited in connection order. Returns an empty list when
/// `start` is not in the plan.
pub fn trace_connections<'a>(plan: &'a FloorPlan, start: &str) -> Vec<TraceHop<'a>> {
    let Some(origin) = plan.equipment_by_id(start) else {
        return Vec::new();
    };
    let mut adjacency: AHashMap<&str, Vec<(&str, &Connection)>> = AHashMap::new();
    for conn in &plan.connections {
        adjacency
            .entry(conn.from_id.as_str())
            .or_default()
            .push((conn.to_id.as_str(), conn));
        adjacency
            .entry(conn.to_id.as_str())
            .or_default()
            .push((conn.from_id.as_str(), conn));
    }

    let mut hops = vec![TraceHop {
        depth: 0,
        equipment: origin,
        via: None,
    }];
    let mut seen: AHashSet<&str> = AHashSet::from_iter([origin.id.as_str()]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(origin.id.as_str(), 0)]);
    while let Some((node, depth)) = queue.pop_front() {
        for &(next, conn) in adjacency.get(node).into_iter().flatten() {
            if !seen.insert(next) {
                continue;
            }
            let Some(equipment) = plan.equipment_by_id(next) else {
                continue;
            };
            hops.push(TraceHop {
                depth: depth + 1,
                equipment,
                via: Some(conn),
            });
            queue.push_back((next, depth + 1));
        }
    }
    hops
}

fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

fn glyph(e: &Equipment) -> char {
    resolve_equipment_glyph(&e.equipment_type, e.status)
}

/// Renders a [`FloorPlan`] for engineers.
#[derive(Debug, Clone)]
pub struct TracingRenderer {
    config: RendererConfig,
}

impl TracingRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, plan: &FloorPlan, filters: &Filters) -> Result<String, RenderError> {
        if let Some(id) = &filters.trace_from {
            if plan.equipment_by_id(id).is_none() {
                return Err(RenderError::EquipmentNotFound(id.clone()));
            }
        }

        let view = FloorPlanView::new(plan, &self.config)?;
        let mut events: Vec<FailureEvent> = Vec::new();
        for item in plan.equipment.iter().filter(|e| e.status == EquipmentStatus::Failed) {
            events.extend(view.trigger_failure(&item.id, None, OBSERVED_FAILURE_SEVERITY)?);
        }
        if let Some(id) = &filters.trace_from {
            view.highlight(id)?;
        }

        let mut out = String::new();
        let _ = writeln!(out, "System Trace: {} / Floor {}", plan.building, plan.floor);
        out.push_str(&rule('═', self.config.width.max(20)));
        out.push('\n');
        if self.config.show_grid {
            out.push_str(&view.render().to_string());
            out.push('\n');
        }

        out.push('\n');
        match filters.system {
            Some(system) => self.write_system(&mut out, plan, filters, system),
            None => self.write_summaries(&mut out, plan, filters),
        }

        let energy = view.energy_state()?;
        if !energy.sources.is_empty() {
            let _ = writeln!(
                out,
                "\nEnergy: {}/{} energised from {} source(s)",
                energy.energized_count(),
                plan.equipment.len(),
                energy.sources.len()
            );
        }

        if let Some(id) = &filters.trace_from {
            write_trace(&mut out, plan, id);
        }
        if !events.is_empty() {
            write_cascades(&mut out, plan, &events);
        }
        write_faults(&mut out, plan);

        tracing::debug!(
            floor = %plan.floor,
            failures = events.len(),
            "system trace rendered"
        );
        Ok(out)
    }

    fn write_summaries(&self, out: &mut String, plan: &FloorPlan, filters: &Filters) {
        out.push_str("Systems:\n");
        let mut any = false;
        for system in SystemType::ALL {
            let items: Vec<&Equipment> = plan
                .equipment
                .iter()
                .filter(|e| SystemType::of(e) == system && filters.accepts(e))
                .collect();
            if items.is_empty() {
                continue;
            }
            any = true;
            let faulted = items.iter().filter(|e| !e.status.is_operational()).count();
            let links = plan
                .connections
                .iter()
                .filter(|c| items.iter().any(|e| e.id == c.from_id || e.id == c.to_id))
                .count();
            let _ = writeln!(
                out,
                "  {:<11} {} items, {} faulted, {} connections",
                system.as_str(),
                items.len(),
                faulted,
                links
            );
        }
        if !any {
            out.push_str("  (no equipment)\n");
        }
    }

    fn write_system(&self, out: &mut String, plan: &FloorPlan, filters: &Filters, system: SystemType) {
        let items: Vec<&Equipment> = plan
            .equipment
            .iter()
            .filter(|e| filters.accepts(e))
            .collect();
        let _ = writeln!(out, "System: {system} ({} items)", items.len());
        for e in &items {
            let _ = writeln!(out, "  {} {} {} [{}]", glyph(e), e.id, e.name, e.status.as_str());
        }

        let paths = ConnectionPath::resolve_all(&plan.connections, &plan.equipment);
        let member = |id: &str| items.iter().any(|e| e.id == id);
        let shown: Vec<&ConnectionPath> = paths
            .iter()
            .filter(|p| member(&p.from_id) || member(&p.to_id))
            .collect();
        out.push_str("Connections:\n");
        if shown.is_empty() {
            out.push_str("  (none)\n");
        }
        for path in shown {
            let load = if path.capacity > 0.0 {
                format!(
                    "{:.1}/{:.1} ({:.0}%)",
                    path.load,
                    path.capacity,
                    path.utilization() * 100.0
                )
            } else {
                "load n/a".to_string()
            };
            let _ = writeln!(
                out,
                "  {} {} {}▶ {} {} {}{}",
                path.id,
                path.from_id,
                path.line_glyph(),
                path.to_id,
                path.connection_type.as_str(),
                load,
                if path.active { " active" } else { "" }
            );
        }
    }
}

fn write_trace(out: &mut String, plan: &FloorPlan, start: &str) {
    let hops = trace_connections(plan, start);
    let Some(first) = hops.first() else {
        return;
    };
    let _ = writeln!(out, "\nTrace from {} ({}):", first.equipment.id, first.equipment.name);
    for hop in &hops {
        let e = hop.equipment;
        let indent = "  ".repeat(hop.depth + 1);
        match hop.via {
            None => {
                let _ = writeln!(out, "{indent}{} {} {} [{}]", glyph(e), e.id, e.name, e.equipment_type);
            }
            Some(conn) => {
                let _ = writeln!(
                    out,
                    "{indent}└─ {} {} {} [{}] via {} {}",
                    glyph(e),
                    e.id,
                    e.name,
                    e.equipment_type,
                    conn.connection_type.as_str(),
                    conn.id
                );
            }
        }
    }
    let _ = writeln!(out, "  {} reachable", hops.len() - 1);
}

fn write_cascades(out: &mut String, plan: &FloorPlan, events: &[FailureEvent]) {
    out.push_str("\nFailure analysis:\n");
    for event in events {
        let name = plan
            .equipment_by_id(&event.equipment_id)
            .map_or("", |e| e.name.as_str());
        let _ = writeln!(
            out,
            "  {} {} {}: {} failure, {}",
            event.failure_type.glyph(),
            event.equipment_id,
            name,
            event.failure_type.as_str(),
            event.severity
        );
        if event.propagation.is_empty() {
            out.push_str("    no downstream equipment\n");
        }
        for step in &event.propagation {
            let _ = writeln!(
                out,
                "    → {} impact {:.0}% probability {:.0}% after {}",
                step.equipment_id,
                step.impact * 100.0,
                step.probability * 100.0,
                format_delay(step.delay)
            );
        }
    }
}

fn write_faults(out: &mut String, plan: &FloorPlan) {
    let faults: Vec<&Equipment> = plan
        .equipment
        .iter()
        .filter(|e| !e.status.is_operational())
        .collect();
    if faults.is_empty() {
        out.push_str("\nFaults: none\n");
        return;
    }
    let _ = writeln!(
        out,
        "\nFaults: {} of {} ({:.1}%)",
        faults.len(),
        plan.equipment.len(),
        percent(faults.len(), plan.equipment.len())
    );
    for e in faults {
        let _ = writeln!(
            out,
            "  {} {} {} ({}) {}",
            glyph(e),
            e.id,
            e.name,
            e.equipment_type,
            e.status.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use bimview_core::geometry::{Bounds, Point};
    use bimview_core::model::{ConnectionType, Room};

    use super::*;

    fn plan() -> FloorPlan {
        FloorPlan {
            building: "HQ".into(),
            floor: "2".into(),
            level: 2,
            rooms: vec![Room::new("r1", "Plant", Bounds::new(0.0, 0.0, 20.0, 10.0))],
            equipment: vec![
                Equipment::new("p1", "Main panel", "panel", Point::new(2.0, 2.0)),
                Equipment::new("o1", "Outlet", "outlet", Point::new(8.0, 2.0))
                    .with_status(EquipmentStatus::Failed),
                Equipment::new("l1", "Light", "light", Point::new(14.0, 2.0)),
                Equipment::new("s1", "Switch", "network switch", Point::new(14.0, 8.0)),
            ],
            connections: vec![
                Connection::new("c1", ConnectionType::Electrical, "p1", "o1").with_load(50.0, 100.0),
                Connection::new("c2", ConnectionType::Electrical, "o1", "l1"),
                Connection::new("c3", ConnectionType::Data, "s1", "l1"),
            ],
        }
    }

    fn render(filters: &Filters) -> Result<String, RenderError> {
        let config = RendererConfig {
            show_grid: false,
            ..RendererConfig::default()
        };
        TracingRenderer::new(config).render(&plan(), filters)
    }

    #[test]
    fn trace_walks_both_directions() {
        let plan = plan();
        let hops = trace_connections(&plan, "l1");
        let ids: Vec<_> = hops.iter().map(|h| (h.equipment.id.as_str(), h.depth)).collect();
        assert_eq!(ids, vec![("l1", 0), ("o1", 1), ("s1", 1), ("p1", 2)]);
        assert_eq!(hops[3].via.map(|c| c.id.as_str()), Some("c1"));
        assert!(trace_connections(&plan, "ghost").is_empty());
    }

    #[test]
    fn summaries_group_by_system() {
        let out = render(&Filters::default()).unwrap();
        assert!(out.contains("  electrical  3 items, 1 faulted, 3 connections"));
        assert!(out.contains("  network     1 items, 0 faulted, 1 connections"));
    }

    #[test]
    fn selected_system_lists_its_connections() {
        let filters = Filters {
            system: Some(SystemType::Network),
            ..Filters::default()
        };
        let out = render(&filters).unwrap();
        assert!(out.contains("System: network (1 items)"));
        assert!(out.contains("  c3 s1 ┄▶ l1 data load n/a"));
        assert!(!out.contains("  c1 "));
    }

    #[test]
    fn failed_equipment_gets_cascade_and_fault_entry() {
        let out = render(&Filters::default()).unwrap();
        assert!(out.contains("Failure analysis:"));
        assert!(out.contains("    → l1 impact 100% probability 70% after 30s"));
        assert!(out.trim_end().ends_with("  ✗ o1 Outlet (outlet) failed"));
    }

    #[test]
    fn trace_from_lists_hops() {
        let filters = Filters {
            trace_from: Some("p1".into()),
            ..Filters::default()
        };
        let out = render(&filters).unwrap();
        assert!(out.contains("Trace from p1 (Main panel):"));
        assert!(out.contains("    └─ ✗ o1 Outlet [outlet] via electrical c1"));
        assert!(out.contains("  3 reachable"));
    }

    #[test]
    fn unknown_trace_start_is_an_error() {
        let filters = Filters {
            trace_from: Some("ghost".into()),
            ..Filters::default()
        };
        assert_eq!(render(&filters), Err(RenderError::EquipmentNotFound("ghost".into())));
    }

    #[test]
    fn delays_are_compact() {
        assert_eq!(format_delay(Duration::from_secs(30)), "30s");
        assert_eq!(format_delay(Duration::from_secs(150)), "2m30s");
    }
}
