#![forbid(unsafe_code)]

//! The router's input contract.

use bimview_core::config::ViewLevel;
use bimview_core::model::{Building, Equipment, EquipmentStatus, FloorPlan, SpatialAnchor};

use crate::error::RenderError;
use crate::system::SystemType;

/// The single data source a request carries.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Building(Building),
    FloorPlan(FloorPlan),
    Anchors(Vec<SpatialAnchor>),
}

impl DataSource {
    /// Name of the data, as used in validation messages.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Building(_) => "building",
            Self::FloorPlan(_) => "floor plan",
            Self::Anchors(_) => "spatial anchor",
        }
    }
}

/// "Within `radius` of a point" filter for spatial anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFilter {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
}

impl NearFilter {
    /// Squared-distance test; no square root.
    #[inline]
    pub fn contains(&self, anchor: &SpatialAnchor) -> bool {
        anchor.distance_sq_to(self.x, self.y, self.z) <= self.radius * self.radius
    }
}

/// Optional narrowing applied by the views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Floor level (overview and spatial views).
    pub floor: Option<i32>,
    pub system: Option<SystemType>,
    pub status: Option<EquipmentStatus>,
    pub near: Option<NearFilter>,
    /// Equipment ID to trace connections from (detail view).
    pub trace_from: Option<String>,
}

impl Filters {
    /// Whether equipment passes the system and status filters.
    pub fn accepts(&self, equipment: &Equipment) -> bool {
        self.status.is_none_or(|s| equipment.status == s)
            && self.system.is_none_or(|s| SystemType::of(equipment) == s)
    }

    /// Whether an anchor passes the floor, near, and system filters.
    pub fn accepts_anchor(&self, anchor: &SpatialAnchor) -> bool {
        self.floor.is_none_or(|f| anchor.floor == f)
            && self.near.is_none_or(|n| n.contains(anchor))
            && self
                .system
                .is_none_or(|s| SystemType::infer(&anchor.equipment_path, "") == s)
    }
}

/// A view level, its data, and filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    /// `None` renders at the router's configured `default_view`.
    pub view_level: Option<ViewLevel>,
    pub data: Option<DataSource>,
    pub filters: Filters,
}

impl RenderRequest {
    /// A request with no data, to be filled in by the caller.
    pub fn new(view_level: ViewLevel) -> Self {
        Self {
            view_level: Some(view_level),
            data: None,
            filters: Filters::default(),
        }
    }

    /// A request for `data` at the router's default level.
    pub fn from_data(data: DataSource) -> Self {
        Self::default().with_data(data)
    }

    /// Overview of a building.
    pub fn building(building: Building) -> Self {
        Self::new(ViewLevel::Overview).with_data(DataSource::Building(building))
    }

    /// Detail view of one floor plan.
    pub fn floor_plan(plan: FloorPlan) -> Self {
        Self::new(ViewLevel::Detail).with_data(DataSource::FloorPlan(plan))
    }

    /// Spatial view of a set of anchors.
    pub fn anchors(anchors: Vec<SpatialAnchor>) -> Self {
        Self::new(ViewLevel::Spatial).with_data(DataSource::Anchors(anchors))
    }

    #[must_use]
    pub fn with_data(mut self, data: DataSource) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: ViewLevel) -> Self {
        self.view_level = Some(level);
        self
    }

    /// Set the view level from a user-supplied name.
    pub fn with_level_name(self, name: &str) -> Result<Self, RenderError> {
        Ok(self.with_level(name.parse()?))
    }

    #[must_use]
    pub fn with_floor(mut self, level: i32) -> Self {
        self.filters.floor = Some(level);
        self
    }

    #[must_use]
    pub fn with_system(mut self, system: SystemType) -> Self {
        self.filters.system = Some(system);
        self
    }

    /// Set the system filter from a user-supplied name.
    pub fn with_system_name(self, name: &str) -> Result<Self, RenderError> {
        Ok(self.with_system(name.parse()?))
    }

    #[must_use]
    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.filters.status = Some(status);
        self
    }

    #[must_use]
    pub fn near(mut self, x: f64, y: f64, z: f64, radius: f64) -> Self {
        self.filters.near = Some(NearFilter { x, y, z, radius });
        self
    }

    #[must_use]
    pub fn trace_from(mut self, equipment_id: impl Into<String>) -> Self {
        self.filters.trace_from = Some(equipment_id.into());
        self
    }

    pub fn building_data(&self) -> Option<&Building> {
        match &self.data {
            Some(DataSource::Building(b)) => Some(b),
            _ => None,
        }
    }

    pub fn floor_plan_data(&self) -> Option<&FloorPlan> {
        match &self.data {
            Some(DataSource::FloorPlan(p)) => Some(p),
            _ => None,
        }
    }

    pub fn anchor_data(&self) -> Option<&[SpatialAnchor]> {
        match &self.data {
            Some(DataSource::Anchors(a)) => Some(a),
            _ => None,
        }
    }
}
