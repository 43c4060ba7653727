#![forbid(unsafe_code)]

//! bimview public facade crate.
//!
//! This crate provides the stable surface area for users. It re-exports the
//! common types from the internal crates and offers a small prelude.
//!
//! ```
//! use bimview::prelude::*;
//!
//! let anchors = vec![SpatialAnchor {
//!     id: "a1".into(),
//!     equipment_path: "/HQ/1/ELEC/PANEL-A".into(),
//!     floor: 1,
//!     x: 1.25,
//!     y: 2.5,
//!     z: 0.9,
//!     platform: "ARKit".into(),
//! }];
//! let text = bimview::render_once(&RendererConfig::default(), &RenderRequest::anchors(anchors))?;
//! assert!(text.starts_with("Spatial Anchors: 1 of 1"));
//! # Ok::<(), bimview::Error>(())
//! ```

use std::fmt;
use std::path::Path;

// --- Core re-exports -------------------------------------------------------

pub use bimview_core::{
    Bounds, Building, Connection, ConnectionType, ConfigError, DecayModel, Equipment,
    EquipmentStatus, Floor, FloorPlan, Point, Region, RendererConfig, Room, SpatialAnchor,
    ViewLevel, Viewport,
};

// --- Render re-exports -----------------------------------------------------

pub use bimview_render::{BlendMode, CharBuffer, Compositor, DirtyTracker};

// --- Layer re-exports ------------------------------------------------------

pub use bimview_layers::{
    FailureSimulator, FloorPlanView, Layer, LayerError, LayerManager, Severity,
};

// --- View re-exports -------------------------------------------------------

pub use bimview_views::{
    CancelSource, CancelToken, Filters, LiveMonitor, RenderError, RenderRequest, SystemType,
    ViewRouter,
};

#[cfg(feature = "logging")]
pub mod logging;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for bimview callers.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// The request was rejected by the router.
    Render(RenderError),
    /// Layer registry failure.
    Layer(LayerError),
    /// I/O failure, e.g. starting a live monitor.
    Io(std::io::Error),
    /// Subscriber setup failed.
    #[cfg(feature = "logging")]
    Logging(logging::LoggingError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::Layer(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            #[cfg(feature = "logging")]
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Layer(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "logging")]
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

impl From<LayerError> for Error {
    fn from(err: LayerError) -> Self {
        Self::Layer(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "logging")]
impl From<logging::LoggingError> for Error {
    fn from(err: logging::LoggingError) -> Self {
        Self::Logging(err)
    }
}

/// Standard result type for bimview APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Convenience ----------------------------------------------------------

/// Render one request with a fresh router.
pub fn render_once(config: &RendererConfig, request: &RenderRequest) -> Result<String> {
    Ok(ViewRouter::new(config.clone()).render(request)?)
}

/// Load a TOML config file and build a router from it.
pub fn router_from_file(path: impl AsRef<Path>) -> Result<ViewRouter> {
    let config = RendererConfig::from_toml_file(path)?;
    Ok(ViewRouter::new(config))
}

/// Start a live monitor using the router's own config.
pub fn spawn_live(router: ViewRouter, request: RenderRequest, token: CancelToken) -> Result<LiveMonitor> {
    let config = router.config().clone();
    Ok(LiveMonitor::spawn(router, request, &config, token)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Building, CancelSource, Equipment, EquipmentStatus, Error, Filters, Floor, FloorPlan,
        FloorPlanView, LiveMonitor, Point, RenderRequest, RendererConfig, Result, Room,
        SpatialAnchor, SystemType, ViewLevel, ViewRouter,
    };

    pub use crate::{core, layers, render, views};
}

pub use bimview_core as core;
pub use bimview_layers as layers;
pub use bimview_render as render;
pub use bimview_views as views;
