#![forbid(unsafe_code)]

//! Building data consumed by the renderers.
//!
//! These structures are produced by external collaborators (the BIM parser,
//! the floor-plan cache, the spatial store). The render engine only reads
//! them; nothing here is mutated during a render pass.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

/// Operational status of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Operational,
    Degraded,
    Failed,
    Maintenance,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl EquipmentStatus {
    /// All statuses in display order.
    pub const ALL: [EquipmentStatus; 6] = [
        Self::Operational,
        Self::Degraded,
        Self::Failed,
        Self::Maintenance,
        Self::Offline,
        Self::Unknown,
    ];

    /// Lenient parse of the free-form status strings found in BIM exports.
    ///
    /// Unrecognised values map to [`EquipmentStatus::Unknown`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "operational" | "ok" | "normal" | "active" | "online" | "running" => {
                Self::Operational
            }
            "degraded" | "warning" | "warn" => Self::Degraded,
            "failed" | "failure" | "fault" | "error" | "critical" => Self::Failed,
            "maintenance" | "service" => Self::Maintenance,
            "offline" | "off" | "inactive" => Self::Offline,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the equipment is working normally.
    #[inline]
    pub const fn is_operational(self) -> bool {
        matches!(self, Self::Operational)
    }
}

/// A piece of building equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    /// Free-form type string (e.g. `"outlet"`, `"AHU"`, `"fire_alarm"`).
    #[serde(rename = "type")]
    pub equipment_type: String,
    #[serde(default)]
    pub status: EquipmentStatus,
    /// World location. For building data this is a coarse grid coordinate.
    pub location: Point,
    #[serde(default)]
    pub room_id: Option<String>,
    /// Hierarchical address, e.g. `/B1/3/ELEC/PANEL-A`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Equipment {
    /// Create equipment with operational status and no room.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        equipment_type: impl Into<String>,
        location: Point,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment_type: equipment_type.into(),
            status: EquipmentStatus::Operational,
            location,
            room_id: None,
            path: None,
        }
    }

    /// Set the status (builder pattern).
    #[must_use]
    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the room (builder pattern).
    #[must_use]
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }
}

/// A rectangular room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub bounds: Bounds,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bounds,
        }
    }
}

/// Medium carried by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Electrical,
    Data,
    Water,
    Hvac,
    Gas,
    Fire,
    #[default]
    #[serde(other)]
    Other,
}

impl ConnectionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electrical => "electrical",
            Self::Data => "data",
            Self::Water => "water",
            Self::Hvac => "hvac",
            Self::Gas => "gas",
            Self::Fire => "fire",
            Self::Other => "other",
        }
    }
}

/// A wiring or piping link between two pieces of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
    pub from_id: String,
    pub to_id: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub load: f64,
    #[serde(default)]
    pub capacity: f64,
    /// Intermediate routing points between the two endpoints.
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        connection_type: ConnectionType,
        from_id: impl Into<String>,
        to_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            connection_type,
            from_id: from_id.into(),
            to_id: to_id.into(),
            active: false,
            load: 0.0,
            capacity: 0.0,
            waypoints: Vec::new(),
        }
    }

    /// Set load and capacity (builder pattern).
    #[must_use]
    pub fn with_load(mut self, load: f64, capacity: f64) -> Self {
        self.load = load;
        self.capacity = capacity;
        self
    }

    /// Set the active flag (builder pattern).
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// One floor of a building.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Floor {
    pub level: i32,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

/// A whole building as produced by the BIM parser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub floors: Vec<Floor>,
}

impl Building {
    /// Total equipment across all floors.
    pub fn equipment_count(&self) -> usize {
        self.floors.iter().map(|f| f.equipment.len()).sum()
    }
}

/// A single floor with precise geometry, as served by the floor-plan cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorPlan {
    pub building: String,
    pub floor: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl FloorPlan {
    /// Look up equipment by id.
    pub fn equipment_by_id(&self, id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == id)
    }

    /// World bounds of rooms and equipment, or `None` for an empty plan.
    pub fn bounds(&self) -> Option<Bounds> {
        let rooms = self.rooms.iter().map(|r| r.bounds);
        let equipment = self.equipment.iter().map(|e| Bounds::from_point(e.location));
        rooms.chain(equipment).reduce(|a, b| a.union(&b))
    }
}

/// A millimeter-precision 3-D anchor tied to one piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAnchor {
    pub id: String,
    pub equipment_path: String,
    pub floor: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Capture platform (e.g. `"ARKit"`, `"ARCore"`).
    pub platform: String,
}

impl SpatialAnchor {
    /// Horizontal position as a world point.
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Squared 3-D distance to `(x, y, z)`.
    #[inline]
    pub fn distance_sq_to(&self, x: f64, y: f64, z: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        let dz = self.z - z;
        dx * dx + dy * dy + dz * dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_lenient() {
        assert_eq!(EquipmentStatus::parse("OK"), EquipmentStatus::Operational);
        assert_eq!(EquipmentStatus::parse(" warning "), EquipmentStatus::Degraded);
        assert_eq!(EquipmentStatus::parse("fault"), EquipmentStatus::Failed);
        assert_eq!(EquipmentStatus::parse("weird"), EquipmentStatus::Unknown);
    }

    #[test]
    fn status_deserializes_unknown_values() {
        let s: EquipmentStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(s, EquipmentStatus::Failed);
        let s: EquipmentStatus = serde_json::from_str("\"exploded\"").unwrap();
        assert_eq!(s, EquipmentStatus::Unknown);
    }

    #[test]
    fn floor_plan_deserializes_with_defaults() {
        let json = r#"{
            "building": "HQ",
            "floor": "Ground",
            "rooms": [{"id": "r1", "name": "Office",
                       "bounds": {"min_x": 0, "min_y": 0, "max_x": 10, "max_y": 8}}],
            "equipment": [{"id": "e1", "name": "Outlet 1", "type": "outlet",
                           "location": {"x": 5, "y": 4}}],
            "connections": [{"id": "c1", "type": "electrical",
                             "from_id": "e1", "to_id": "e2"}]
        }"#;
        let plan: FloorPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.level, 0);
        assert_eq!(plan.equipment[0].status, EquipmentStatus::Unknown);
        assert_eq!(plan.connections[0].connection_type, ConnectionType::Electrical);
        assert!(!plan.connections[0].active);
        assert_eq!(plan.bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 8.0)));
    }

    #[test]
    fn anchor_distance() {
        let a = SpatialAnchor {
            id: "a".into(),
            equipment_path: "/B/1/x".into(),
            floor: 1,
            x: 1.0,
            y: 2.0,
            z: 2.0,
            platform: "ARKit".into(),
        };
        assert_eq!(a.distance_sq_to(0.0, 0.0, 0.0), 9.0);
    }
}
