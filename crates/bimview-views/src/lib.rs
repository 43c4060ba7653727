#![forbid(unsafe_code)]

//! Views: the multi-level router and its three renderers.
//!
//! # Role in bimview
//! `bimview-views` is the entry point for callers. A [`RenderRequest`]
//! carries one data source, a [`ViewLevel`](bimview_core::ViewLevel), and
//! filters; the [`ViewRouter`] checks that the data matches the level and
//! returns the rendered text.
//!
//! # Levels
//! - **Overview** ([`SchematicRenderer`]): a [`Building`](bimview_core::Building)
//!   on its coarse grid, with legend and status summary.
//! - **Detail** ([`TracingRenderer`]): a [`FloorPlan`](bimview_core::FloorPlan)
//!   through the layer stack, plus system, trace, cascade, and fault sections.
//! - **Spatial** ([`SpatialRenderer`]): anchor table, scatter grid, platforms.
//!
//! [`LiveMonitor`] re-renders one request on an interval in the background.

pub mod cancellation;
pub mod error;
pub mod live;
pub mod request;
pub mod router;
pub mod schematic;
pub mod spatial;
pub mod system;
pub mod system_trace;
mod text;

pub use cancellation::{CancelSource, CancelToken};
pub use error::RenderError;
pub use live::LiveMonitor;
pub use request::{DataSource, Filters, NearFilter, RenderRequest};
pub use router::ViewRouter;
pub use schematic::SchematicRenderer;
pub use spatial::SpatialRenderer;
pub use system::SystemType;
pub use system_trace::{TraceHop, TracingRenderer, trace_connections};
