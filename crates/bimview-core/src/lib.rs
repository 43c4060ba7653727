#![forbid(unsafe_code)]

//! Core: geometry, viewport mapping, building model, and configuration.
//!
//! # Role in bimview
//! `bimview-core` is the shared vocabulary. It defines the two coordinate
//! spaces (world and screen), the [`Viewport`](viewport::Viewport) that maps
//! between them, and the read-only building data the renderers consume.
//!
//! # Primary responsibilities
//! - **Geometry**: world [`Point`](geometry::Point)/[`Bounds`](geometry::Bounds)
//!   and screen [`Region`](geometry::Region).
//! - **Viewport**: pan/zoom/floor state and `fit_to_content`.
//! - **Model**: `Building`, `FloorPlan`, `Equipment`, `Connection`, `SpatialAnchor`.
//! - **Config**: [`RendererConfig`](config::RendererConfig) loaded from TOML/JSON.

pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod viewport;

pub use config::{DecayModel, RendererConfig, ViewLevel};
pub use error::{ConfigError, ParseViewLevelError};
pub use geometry::{Bounds, Point, Region};
pub use model::{
    Building, Connection, ConnectionType, Equipment, EquipmentStatus, Floor, FloorPlan, Room,
    SpatialAnchor,
};
pub use viewport::Viewport;
