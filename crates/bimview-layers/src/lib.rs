#![forbid(unsafe_code)]

//! Layers: the registry, concrete building layers, and time-based simulators.
//!
//! # Role in bimview
//! `bimview-layers` turns building data into drawable concerns. Each concern
//! is a [`Layer`] owned by a caller-held [`LayerManager`], which renders the
//! visible ones in priority order into a shared buffer.
//!
//! # Primary responsibilities
//! - **Registry**: [`LayerManager`] with RwLock-guarded registration,
//!   priority-ordered rendering, ticks, and dirty-region redraw.
//! - **Layers**: structure, equipment, connections, energy flow, failures.
//! - **Simulators**: energy flow over the electrical graph and failure
//!   propagation with a configurable decay on a simulated clock.
//! - **FloorPlanView**: the standard stack over one [`FloorPlan`](bimview_core::FloorPlan).

pub mod connection;
pub mod energy;
pub mod equipment;
pub mod error;
pub mod failure;
pub mod floor_plan;
pub mod label;
pub mod layer;
pub mod manager;
pub mod structure;

pub use connection::{ConnectionLayer, ConnectionPath};
pub use energy::{EdgeFlow, EnergyLayer, EnergyState};
pub use equipment::EquipmentLayer;
pub use error::LayerError;
pub use failure::{
    FailureEvent, FailureLayer, FailureSimulator, FailureType, PropagationStep, RiskZone, Severity,
    SimClock,
};
pub use floor_plan::FloorPlanView;
pub use layer::{Layer, LayerMeta, priority};
pub use manager::{LayerInfo, LayerManager};
pub use structure::StructureLayer;
