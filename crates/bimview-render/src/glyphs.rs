#![forbid(unsafe_code)]

//! Immutable glyph tables.
//!
//! Every symbol decision (equipment type, status override, connection style,
//! box drawing) is a lookup into a `const`/`static` table with an explicit
//! default, so rendering is deterministic and safe for concurrent reads.

use bimview_core::model::{ConnectionType, EquipmentStatus};

/// Glyph for equipment types with no table entry.
pub const FALLBACK_EQUIPMENT_GLYPH: char = '•';
/// Glyph that replaces any type glyph for failed equipment.
pub const FAILED_GLYPH: char = '✗';
/// Glyph that replaces any type glyph for degraded equipment.
pub const DEGRADED_GLYPH: char = '△';
/// Interior fill for rooms.
pub const FLOOR_GLYPH: char = '·';

/// Equipment type substrings and their glyphs, matched in order.
///
/// Order matters: `"fire_alarm_panel"` must hit `fire` before `panel`.
static EQUIPMENT_GLYPHS: &[(&str, char)] = &[
    ("fire", '♨'),
    ("smoke", '♨'),
    ("sprinkler", '♨'),
    ("extinguisher", '♨'),
    ("outlet", '⊙'),
    ("receptacle", '⊙'),
    ("transformer", '⊗'),
    ("panel", '▣'),
    ("breaker", '▣'),
    ("switchboard", '▣'),
    ("generator", '◘'),
    ("ups", '◘'),
    ("light", '☼'),
    ("lamp", '☼'),
    ("router", '▤'),
    ("switch", '▤'),
    ("network", '▤'),
    ("access_point", '▤'),
    ("server", '▤'),
    ("ahu", '≋'),
    ("hvac", '≋'),
    ("air", '≋'),
    ("rtu", '≋'),
    ("chiller", '≋'),
    ("boiler", '≋'),
    ("vav", '▽'),
    ("damper", '▽'),
    ("diffuser", '▽'),
    ("thermostat", '◈'),
    ("sensor", '◎'),
    ("detector", '◎'),
    ("camera", '◐'),
    ("pump", '⊕'),
    ("valve", '⋈'),
    ("door", '⌂'),
    ("reader", '⌂'),
    ("lock", '⌂'),
    ("elevator", '⇅'),
];

/// Glyph for an equipment type string (case-insensitive substring match).
pub fn equipment_glyph(equipment_type: &str) -> char {
    let normalized = equipment_type.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    EQUIPMENT_GLYPHS
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map_or(FALLBACK_EQUIPMENT_GLYPH, |&(_, glyph)| glyph)
}

/// Status override glyph, if the status has one.
#[inline]
pub const fn status_glyph(status: EquipmentStatus) -> Option<char> {
    match status {
        EquipmentStatus::Failed => Some(FAILED_GLYPH),
        EquipmentStatus::Degraded => Some(DEGRADED_GLYPH),
        _ => None,
    }
}

/// Final glyph for a piece of equipment: status override wins over type.
#[inline]
pub fn resolve_equipment_glyph(equipment_type: &str, status: EquipmentStatus) -> char {
    status_glyph(status).unwrap_or_else(|| equipment_glyph(equipment_type))
}

/// All `(type key, glyph)` pairs, for legends.
pub fn equipment_legend() -> impl Iterator<Item = (&'static str, char)> {
    EQUIPMENT_GLYPHS.iter().copied()
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Load classification of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadLevel {
    Normal,
    Active,
    Overloaded,
}

/// Utilisation above which a connection is overloaded.
pub const OVERLOAD_THRESHOLD: f64 = 0.9;
/// Utilisation above which an active connection shows as active.
pub const ACTIVE_THRESHOLD: f64 = 0.1;

impl LoadLevel {
    /// Classify a connection from its live load.
    ///
    /// `load / capacity > 0.9` is overloaded; active and `> 0.1` is active;
    /// everything else (including zero capacity) is normal.
    pub fn classify(load: f64, capacity: f64, active: bool) -> Self {
        if capacity <= 0.0 || !load.is_finite() || !capacity.is_finite() {
            return Self::Normal;
        }
        let utilization = load / capacity;
        if utilization > OVERLOAD_THRESHOLD {
            Self::Overloaded
        } else if active && utilization > ACTIVE_THRESHOLD {
            Self::Active
        } else {
            Self::Normal
        }
    }
}

/// Line and junction glyphs for one connection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStyle {
    pub normal: char,
    pub active: char,
    pub overloaded: char,
    pub junction: char,
}

impl ConnectionStyle {
    pub const ELECTRICAL: Self = Self {
        normal: '─',
        active: '═',
        overloaded: '▬',
        junction: '●',
    };

    pub const DATA: Self = Self {
        normal: '┄',
        active: '━',
        overloaded: '▬',
        junction: '◉',
    };

    pub const WATER: Self = Self {
        normal: '~',
        active: '≈',
        overloaded: '▬',
        junction: '○',
    };

    pub const HVAC: Self = Self {
        normal: '┈',
        active: '═',
        overloaded: '▬',
        junction: '◌',
    };

    pub const GAS: Self = Self {
        normal: '╌',
        active: '═',
        overloaded: '▬',
        junction: '◍',
    };

    pub const FIRE: Self = Self {
        normal: '┅',
        active: '═',
        overloaded: '▬',
        junction: '◆',
    };

    pub const OTHER: Self = Self {
        normal: '─',
        active: '═',
        overloaded: '▬',
        junction: '◦',
    };

    /// Style for a connection type.
    pub const fn for_type(connection_type: ConnectionType) -> Self {
        match connection_type {
            ConnectionType::Electrical => Self::ELECTRICAL,
            ConnectionType::Data => Self::DATA,
            ConnectionType::Water => Self::WATER,
            ConnectionType::Hvac => Self::HVAC,
            ConnectionType::Gas => Self::GAS,
            ConnectionType::Fire => Self::FIRE,
            ConnectionType::Other => Self::OTHER,
        }
    }

    /// Line glyph for a load level.
    #[inline]
    pub const fn line(&self, level: LoadLevel) -> char {
        match level {
            LoadLevel::Normal => self.normal,
            LoadLevel::Active => self.active,
            LoadLevel::Overloaded => self.overloaded,
        }
    }
}

// ---------------------------------------------------------------------------
// Box drawing
// ---------------------------------------------------------------------------

/// Border characters for drawing rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub vertical: char,
    pub horizontal: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderSet {
    /// Single-line border (│, ─).
    pub const PLAIN: Self = Self {
        vertical: '│',
        horizontal: '─',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
    };

    /// Double lines (║, ═).
    pub const DOUBLE: Self = Self {
        vertical: '║',
        horizontal: '═',
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
    };

    /// Glyph for a cell given which rectangle edges it lies on.
    ///
    /// Returns `None` for interior cells.
    pub fn glyph_for(&self, edges: Edges) -> Option<char> {
        let top = edges.contains(Edges::TOP);
        let bottom = edges.contains(Edges::BOTTOM);
        let left = edges.contains(Edges::LEFT);
        let right = edges.contains(Edges::RIGHT);
        match (top, bottom, left, right) {
            (false, false, false, false) => None,
            (true, _, true, _) => Some(self.top_left),
            (true, _, _, true) => Some(self.top_right),
            (_, true, true, _) => Some(self.bottom_left),
            (_, true, _, true) => Some(self.bottom_right),
            (true, _, _, _) | (_, true, _, _) => Some(self.horizontal),
            _ => Some(self.vertical),
        }
    }
}

bitflags::bitflags! {
    /// Which rectangle edges a cell lies on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Edges: u8 {
        const NONE   = 0b0000;
        const TOP    = 0b0001;
        const RIGHT  = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT   = 0b1000;
    }
}

impl Edges {
    /// Edges touched by cell `(x, y)` within the inclusive rectangle `[x0, x1] x [y0, y1]`.
    pub fn at(x: i32, y: i32, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let mut edges = Self::NONE;
        if y == y0 {
            edges |= Self::TOP;
        }
        if y == y1 {
            edges |= Self::BOTTOM;
        }
        if x == x0 {
            edges |= Self::LEFT;
        }
        if x == x1 {
            edges |= Self::RIGHT;
        }
        edges
    }
}
