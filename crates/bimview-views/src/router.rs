#![forbid(unsafe_code)]

//! Dispatch from a [`RenderRequest`] to the renderer for its view level.

use bimview_core::config::{RendererConfig, ViewLevel};
use bimview_render::ansi;

use crate::error::RenderError;
use crate::request::RenderRequest;
use crate::schematic::SchematicRenderer;
use crate::spatial::SpatialRenderer;
use crate::system_trace::TracingRenderer;

/// Picks and runs one of the three renderers per request.
///
/// Each call is independent: there is no state carried between renders and
/// no transition between levels within a call.
#[derive(Debug, Clone)]
pub struct ViewRouter {
    config: RendererConfig,
    schematic: SchematicRenderer,
    tracing: TracingRenderer,
    spatial: SpatialRenderer,
}

impl ViewRouter {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            schematic: SchematicRenderer::new(config.clone()),
            tracing: TracingRenderer::new(config.clone()),
            spatial: SpatialRenderer::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The level a request renders at: its own, else the configured default.
    pub fn level_for(&self, request: &RenderRequest) -> ViewLevel {
        request.view_level.unwrap_or(self.config.default_view)
    }

    /// Check that the request carries the data its level needs.
    pub fn validate(&self, request: &RenderRequest) -> Result<(), RenderError> {
        let level = self.level_for(request);
        match level {
            ViewLevel::Overview => require(request.building_data(), level, "building").map(|_| ()),
            ViewLevel::Detail => require(request.floor_plan_data(), level, "floor plan").map(|_| ()),
            ViewLevel::Spatial => require(request.anchor_data(), level, "spatial anchor").map(|_| ()),
        }
    }

    /// Render the request to text, colorized when the config asks for it.
    pub fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let level = self.level_for(request);
        let _span = tracing::debug_span!("view_render", level = %level).entered();
        let filters = &request.filters;
        let rendered = match level {
            ViewLevel::Overview => require(request.building_data(), level, "building")
                .map(|building| self.schematic.render(building, filters)),
            ViewLevel::Detail => require(request.floor_plan_data(), level, "floor plan")
                .and_then(|plan| self.tracing.render(plan, filters)),
            ViewLevel::Spatial => require(request.anchor_data(), level, "spatial anchor")
                .map(|anchors| self.spatial.render(anchors, filters)),
        };
        let text = rendered.inspect_err(|err| {
            tracing::debug!(error = %err, "render request rejected");
        })?;
        Ok(if self.config.color {
            ansi::colorize(&text)
        } else {
            text
        })
    }

    /// Render with the level given by name, overriding the request's own.
    pub fn render_named(&self, level: &str, request: &RenderRequest) -> Result<String, RenderError> {
        let request = request.clone().with_level_name(level)?;
        self.render(&request)
    }
}

/// The data a level needs, or the validation failure naming it.
fn require<T>(data: Option<T>, level: ViewLevel, field: &'static str) -> Result<T, RenderError> {
    data.ok_or(RenderError::MissingData { level, field })
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
