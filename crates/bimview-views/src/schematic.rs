#![forbid(unsafe_code)]

//! Building overview on a coarse grid.
//!
//! Equipment locations in a [`Building`] are grid coordinates, not
//! measurements. Each floor is plotted at [`CELL_COLUMNS`] columns per grid
//! unit, shrunk when the floor is wider than the terminal.

use std::fmt::Write as _;

use bimview_core::config::RendererConfig;
use bimview_core::geometry::Bounds;
use bimview_core::model::{Building, Equipment, EquipmentStatus, Floor};
use bimview_render::buffer::CharBuffer;
use bimview_render::compositor::categorize;
use bimview_render::glyphs::{BorderSet, resolve_equipment_glyph, status_glyph};

use crate::request::Filters;
use crate::text::{draw_frame, grid_scale, percent, rule};

/// Columns per grid unit at full size.
pub const CELL_COLUMNS: f64 = 2.0;
/// Rows per grid unit at full size.
pub const CELL_ROWS: f64 = 1.0;
/// Tallest floor grid, in rows, including its frame.
pub const MAX_GRID_ROWS: u16 = 20;

/// Renders a [`Building`] as headers, per-floor grids, legend, and status.
#[derive(Debug, Clone)]
pub struct SchematicRenderer {
    config: RendererConfig,
}

impl SchematicRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, building: &Building, filters: &Filters) -> String {
        let mut out = String::new();
        let width = self.config.width.max(20);
        let _ = writeln!(out, "Building: {} ({})", building.name, building.id);
        let _ = writeln!(
            out,
            "Floors: {} | Equipment: {}",
            building.floors.len(),
            building.equipment_count()
        );
        out.push_str(&rule('═', width));
        out.push('\n');

        let floors: Vec<&Floor> = building
            .floors
            .iter()
            .filter(|f| filters.floor.is_none_or(|level| f.level == level))
            .collect();
        if floors.is_empty() {
            match filters.floor {
                Some(level) => {
                    let _ = writeln!(out, "\nNo floor at level {level}");
                }
                None => out.push_str("\nNo floors\n"),
            }
        }

        let mut shown: Vec<&Equipment> = Vec::new();
        for floor in floors {
            let items: Vec<&Equipment> =
                floor.equipment.iter().filter(|e| filters.accepts(e)).collect();
            let _ = writeln!(
                out,
                "\nFloor {}: {} ({} items)",
                floor.level,
                floor.name,
                items.len()
            );
            if items.is_empty() {
                out.push_str("  (no equipment)\n");
            } else if self.config.show_grid {
                out.push_str(&plot_floor(&items, width).to_string());
                out.push('\n');
            } else {
                for item in &items {
                    let glyph = resolve_equipment_glyph(&item.equipment_type, item.status);
                    let _ = writeln!(
                        out,
                        "  {glyph} {} ({}) {}",
                        item.name,
                        item.equipment_type,
                        item.status.as_str()
                    );
                }
            }
            shown.extend(items);
        }

        if self.config.show_legend && !shown.is_empty() {
            out.push('\n');
            out.push_str(&legend(&shown));
            out.push('\n');
        }
        if self.config.show_status {
            out.push('\n');
            out.push_str(&status_summary(&shown));
            out.push('\n');
        }
        tracing::debug!(building = %building.id, shown = shown.len(), "schematic rendered");
        out
    }
}

/// Plot equipment into a framed grid at most `width` columns wide.
fn plot_floor(items: &[&Equipment], width: u16) -> CharBuffer {
    let Some(bounds) = Bounds::from_points(items.iter().map(|e| &e.location)) else {
        return CharBuffer::new(0, 0);
    };
    let inner_w = width.saturating_sub(2).max(1);
    let inner_h = MAX_GRID_ROWS.saturating_sub(2).max(1);
    let sx = grid_scale(bounds.width(), inner_w, CELL_COLUMNS);
    let sy = grid_scale(bounds.height(), inner_h, CELL_ROWS);
    let cols = ((bounds.width() * sx).round() as u16).saturating_add(1).min(inner_w);
    let rows = ((bounds.height() * sy).round() as u16).saturating_add(1).min(inner_h);

    let mut buf = CharBuffer::new(cols + 2, rows + 2);
    draw_frame(&mut buf, &BorderSet::PLAIN);

    // Higher-priority glyphs are drawn last so alerts win shared cells.
    let mut ordered: Vec<(char, &Equipment)> = items
        .iter()
        .map(|e| (resolve_equipment_glyph(&e.equipment_type, e.status), *e))
        .collect();
    ordered.sort_by_key(|(glyph, _)| categorize(*glyph));
    for (glyph, item) in ordered {
        let col = ((item.location.x - bounds.min_x) * sx).round() as i32 + 1;
        let row = ((item.location.y - bounds.min_y) * sy).round() as i32 + 1;
        buf.set_signed(col.min(i32::from(cols)), row.min(i32::from(rows)), glyph);
    }
    buf
}

/// One entry per distinct glyph in first-seen order.
fn legend(items: &[&Equipment]) -> String {
    let mut entries: Vec<(char, String)> = Vec::new();
    for item in items {
        let glyph = resolve_equipment_glyph(&item.equipment_type, item.status);
        if entries.iter().any(|(g, _)| *g == glyph) {
            continue;
        }
        let label = if status_glyph(item.status).is_some() {
            item.status.as_str().to_string()
        } else {
            item.equipment_type.to_ascii_lowercase()
        };
        entries.push((glyph, label));
    }
    let parts: Vec<String> = entries.iter().map(|(g, l)| format!("{g} {l}")).collect();
    format!("Legend: {}", parts.join("  "))
}

/// Percentage of items in each status that occurs.
fn status_summary(items: &[&Equipment]) -> String {
    if items.is_empty() {
        return "Status: no equipment".to_string();
    }
    let total = items.len();
    let parts: Vec<String> = EquipmentStatus::ALL
        .iter()
        .filter_map(|&status| {
            let n = items.iter().filter(|e| e.status == status).count();
            (n > 0).then(|| format!("{} {:.1}% ({n})", status.as_str(), percent(n, total)))
        })
        .collect();
    format!("Status: {total} items | {}", parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use bimview_core::geometry::Point;

    use super::*;

    fn building() -> Building {
        Building {
            id: "b1".into(),
            name: "HQ".into(),
            floors: vec![
                Floor {
                    level: 1,
                    name: "Ground".into(),
                    rooms: Vec::new(),
                    equipment: vec![
                        Equipment::new("p1", "Main panel", "panel", Point::new(0.0, 0.0)),
                        Equipment::new("o1", "Outlet", "outlet", Point::new(4.0, 2.0)),
                        Equipment::new("l1", "Light", "light", Point::new(2.0, 1.0))
                            .with_status(EquipmentStatus::Failed),
                    ],
                },
                Floor {
                    level: 2,
                    name: "Roof".into(),
                    rooms: Vec::new(),
                    equipment: vec![Equipment::new("a1", "AHU", "ahu", Point::new(3.0, 3.0))],
                },
            ],
        }
    }

    fn render(config: RendererConfig, filters: &Filters) -> String {
        SchematicRenderer::new(config).render(&building(), filters)
    }

    #[test]
    fn grid_places_equipment_at_fixed_cell_size() {
        let out = render(RendererConfig::default(), &Filters::default());
        let lines: Vec<&str> = out.lines().collect();
        let top = lines.iter().position(|l| l.starts_with("Floor 1")).unwrap() + 1;
        assert_eq!(lines[top], "┌─────────┐");
        assert_eq!(lines[top + 1], "│▣        │");
        assert_eq!(lines[top + 2], "│    ✗    │");
        assert_eq!(lines[top + 3], "│        ⊙│");
        assert_eq!(lines[top + 4], "└─────────┘");
    }

    #[test]
    fn single_point_floor_does_not_divide_by_zero() {
        let out = render(RendererConfig::default(), &Filters::default());
        assert!(out.contains("Floor 2: Roof (1 items)\n┌─┐\n│≋│\n└─┘"));
    }

    #[test]
    fn floor_filter_and_summary() {
        let filters = Filters {
            floor: Some(1),
            ..Filters::default()
        };
        let out = render(RendererConfig::default(), &filters);
        assert!(!out.contains("Roof"));
        assert!(out.contains("Legend: ▣ panel  ⊙ outlet  ✗ failed"));
        assert!(out.contains("Status: 3 items | operational 66.7% (2) | failed 33.3% (1)"));
    }

    #[test]
    fn missing_floor_is_reported() {
        let filters = Filters {
            floor: Some(9),
            ..Filters::default()
        };
        let out = render(RendererConfig::default(), &filters);
        assert!(out.contains("No floor at level 9"));
        assert!(out.contains("Status: no equipment"));
    }

    #[test]
    fn list_mode_without_grid() {
        let config = RendererConfig {
            show_grid: false,
            show_legend: false,
            show_status: false,
            ..RendererConfig::default()
        };
        let filters = Filters {
            status: Some(EquipmentStatus::Failed),
            ..Filters::default()
        };
        let out = render(config, &filters);
        assert!(out.contains("  ✗ Light (light) failed"));
        assert!(!out.contains("Main panel"));
        assert!(!out.contains("Legend"));
        assert!(out.contains("Floor 2: Roof (0 items)\n  (no equipment)"));
    }
}
