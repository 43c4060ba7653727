#![forbid(unsafe_code)]

//! Precise anchor tables and scatter grids for field work.

use std::fmt::Write as _;

use ahash::AHashMap;
use bimview_core::config::RendererConfig;
use bimview_core::geometry::Bounds;
use bimview_core::model::SpatialAnchor;
use bimview_render::buffer::CharBuffer;
use bimview_render::glyphs::BorderSet;

use crate::request::Filters;
use crate::text::{draw_frame, grid_scale, pad, percent};

/// Marker for a grid cell holding one anchor.
pub const ANCHOR_GLYPH: char = '◆';
/// Marker for a cell holding more than nine anchors.
pub const CROWDED_GLYPH: char = '+';
/// Tallest scatter grid, in rows, including its frame.
pub const MAX_GRID_ROWS: u16 = 16;

/// Column widths: equipment, floor, x, y, z, platform.
const COLUMNS: [usize; 6] = [28, 5, 10, 10, 10, 10];
const HEADERS: [&str; 6] = ["Equipment", "Floor", "X", "Y", "Z", "Platform"];

/// Renders [`SpatialAnchor`]s as a table, a scatter grid, and platform counts.
#[derive(Debug, Clone)]
pub struct SpatialRenderer {
    config: RendererConfig,
}

impl SpatialRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, anchors: &[SpatialAnchor], filters: &Filters) -> String {
        let shown: Vec<&SpatialAnchor> =
            anchors.iter().filter(|a| filters.accepts_anchor(a)).collect();

        let mut out = String::new();
        let _ = writeln!(out, "Spatial Anchors: {} of {}", shown.len(), anchors.len());
        if let Some(level) = filters.floor {
            let _ = writeln!(out, "Floor: {level}");
        }
        if let Some(near) = &filters.near {
            let _ = writeln!(
                out,
                "Within {:.3} of ({:.3}, {:.3}, {:.3})",
                near.radius, near.x, near.y, near.z
            );
        }
        if shown.is_empty() {
            out.push_str("No anchors match\n");
            return out;
        }

        out.push_str(&table(&shown));
        if self.config.show_grid {
            out.push('\n');
            out.push_str(&scatter(&shown, self.config.width, self.config.height));
        }
        if self.config.show_status {
            out.push('\n');
            out.push_str(&platform_stats(&shown));
        }
        tracing::debug!(anchors = anchors.len(), shown = shown.len(), "spatial rendered");
        out
    }
}

fn border_row(left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = COLUMNS.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

fn table_row(cells: [String; 6]) -> String {
    let mut row = String::from("│");
    for cell in &cells {
        let _ = write!(row, " {cell} │");
    }
    row.push('\n');
    row
}

fn table(anchors: &[&SpatialAnchor]) -> String {
    let mut out = border_row('┌', '┬', '┐');
    out.push_str(&table_row([
        pad(HEADERS[0], COLUMNS[0]),
        format!("{:>w$}", HEADERS[1], w = COLUMNS[1]),
        format!("{:>w$}", HEADERS[2], w = COLUMNS[2]),
        format!("{:>w$}", HEADERS[3], w = COLUMNS[3]),
        format!("{:>w$}", HEADERS[4], w = COLUMNS[4]),
        pad(HEADERS[5], COLUMNS[5]),
    ]));
    out.push_str(&border_row('├', '┼', '┤'));
    for a in anchors {
        out.push_str(&table_row([
            pad(&a.equipment_path, COLUMNS[0]),
            format!("{:>w$}", a.floor, w = COLUMNS[1]),
            format!("{:>w$.3}", a.x, w = COLUMNS[2]),
            format!("{:>w$.3}", a.y, w = COLUMNS[3]),
            format!("{:>w$.3}", a.z, w = COLUMNS[4]),
            pad(&a.platform, COLUMNS[5]),
        ]));
    }
    out.push_str(&border_row('└', '┴', '┘'));
    out
}

/// Plot anchors' horizontal positions into a framed grid.
///
/// Each axis is scaled independently from the anchor bounding box; a cell
/// shared by several anchors shows their count.
fn scatter(anchors: &[&SpatialAnchor], width: u16, height: u16) -> String {
    let points: Vec<_> = anchors.iter().map(|a| a.position()).collect();
    let Some(bounds) = Bounds::from_points(&points) else {
        return String::new();
    };
    let inner_w = width.saturating_sub(2).max(1);
    let inner_h = (height / 2).clamp(3, MAX_GRID_ROWS).saturating_sub(2);
    let sx = grid_scale(bounds.width(), inner_w, f64::INFINITY);
    let sy = grid_scale(bounds.height(), inner_h, f64::INFINITY);
    let cols = ((bounds.width() * sx).round() as u16).saturating_add(1).min(inner_w);
    let rows = ((bounds.height() * sy).round() as u16).saturating_add(1).min(inner_h);

    let mut counts: AHashMap<(u16, u16), usize> = AHashMap::new();
    for p in &points {
        let col = ((p.x - bounds.min_x) * sx).round().clamp(0.0, f64::from(cols - 1)) as u16;
        let row = ((p.y - bounds.min_y) * sy).round().clamp(0.0, f64::from(rows - 1)) as u16;
        *counts.entry((col, row)).or_default() += 1;
    }

    let mut buf = CharBuffer::new(cols + 2, rows + 2);
    draw_frame(&mut buf, &BorderSet::PLAIN);
    for (&(col, row), &n) in &counts {
        let glyph = match n {
            1 => ANCHOR_GLYPH,
            2..=9 => char::from_digit(n as u32, 10).unwrap_or(CROWDED_GLYPH),
            _ => CROWDED_GLYPH,
        };
        buf.set(col + 1, row + 1, glyph);
    }

    let mut out = buf.to_string();
    let _ = writeln!(
        out,
        "\nExtent: x {:.3}..{:.3}, y {:.3}..{:.3}",
        bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
    );
    out
}

/// Anchor counts per capture platform, most common first.
fn platform_stats(anchors: &[&SpatialAnchor]) -> String {
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for a in anchors {
        *counts.entry(a.platform.as_str()).or_default() += 1;
    }
    let mut rows: Vec<(&str, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut out = String::from("Platforms:\n");
    for (platform, n) in rows {
        let _ = writeln!(
            out,
            "  {} {:>4} ({:.1}%)",
            pad(platform, 12),
            n,
            percent(n, anchors.len())
        );
    }
    out
}
