#![forbid(unsafe_code)]

//! A floor plan wired up as the standard layer stack.
//!
//! [`FloorPlanView`] owns its [`LayerManager`] and [`Viewport`]; nothing is
//! shared between views, so two views of the same plan never interfere.

use std::time::Duration;

use bimview_core::config::RendererConfig;
use bimview_core::geometry::{Bounds, Region};
use bimview_core::model::{EquipmentStatus, FloorPlan};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;

use crate::connection::{ConnectionLayer, ConnectionPath};
use crate::energy::{EnergyLayer, EnergyState};
use crate::equipment::EquipmentLayer;
use crate::error::LayerError;
use crate::failure::{FailureEvent, FailureLayer, FailureSimulator, FailureType, RiskZone, Severity};
use crate::manager::LayerManager;
use crate::structure::StructureLayer;

/// Structure, equipment, connection, energy, and failure layers over one floor.
#[derive(Debug)]
pub struct FloorPlanView {
    manager: LayerManager,
    viewport: Viewport,
    content: Option<Bounds>,
}

impl FloorPlanView {
    /// Build the layer stack and fit the viewport to the plan.
    ///
    /// The viewport is `config.width x config.height`; an empty plan gets an
    /// origin-anchored viewport at zoom 1.
    pub fn new(plan: &FloorPlan, config: &RendererConfig) -> Result<Self, LayerError> {
        let manager = LayerManager::new();
        manager.add_layer(Box::new(StructureLayer::new(plan.rooms.clone())))?;
        manager.add_layer(Box::new(EquipmentLayer::new(plan.equipment.clone())))?;
        manager.add_layer(Box::new(ConnectionLayer::new(ConnectionPath::resolve_all(
            &plan.connections,
            &plan.equipment,
        ))))?;
        manager.add_layer(Box::new(EnergyLayer::new(
            plan.equipment.clone(),
            plan.connections.clone(),
            config.energy_recompute_ticks,
        )))?;
        manager.add_layer(Box::new(FailureLayer::new(FailureSimulator::new(
            &plan.equipment,
            &plan.connections,
            config.propagation,
        ))))?;

        let content = plan.bounds();
        let mut viewport = match &content {
            Some(bounds) => Viewport::fit_to_content(bounds, config.width, config.height),
            None => Viewport::new(config.width, config.height),
        };
        viewport.floor = plan.floor.clone();
        tracing::debug!(
            floor = %plan.floor,
            rooms = plan.rooms.len(),
            equipment = plan.equipment.len(),
            zoom = viewport.zoom,
            "floor plan view built"
        );
        Ok(Self {
            manager,
            viewport,
            content,
        })
    }

    /// Replace the viewport (keeps its floor label).
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        let floor = std::mem::take(&mut self.viewport.floor);
        self.viewport = viewport;
        if self.viewport.floor.is_empty() {
            self.viewport.floor = floor;
        }
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn manager(&self) -> &LayerManager {
        &self.manager
    }

    /// World extent of the plan.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.content
    }

    /// Refit the viewport to the plan.
    pub fn fit(&mut self) {
        if let Some(bounds) = self.content {
            self.viewport.fit(&bounds);
        }
    }

    /// Full render into a fresh buffer.
    pub fn render(&self) -> CharBuffer {
        let mut buf = CharBuffer::new(self.viewport.width, self.viewport.height);
        self.manager.render_all(&mut buf, &self.viewport);
        buf
    }

    /// Incremental render into `buf`, which must hold the previous frame.
    pub fn render_into(&self, buf: &mut CharBuffer) -> Vec<Region> {
        self.manager.render_dirty(buf, &self.viewport)
    }

    /// Advance animation and simulated time.
    pub fn tick(&self, dt: Duration) {
        self.manager.update_all(dt);
    }

    pub fn set_layer_visible(&self, name: &str, visible: bool) -> Result<(), LayerError> {
        self.manager.set_layer_visible(name, visible)
    }

    /// Highlight equipment. `Ok(false)` for unknown IDs.
    pub fn highlight(&self, id: &str) -> Result<bool, LayerError> {
        self.manager
            .with_layer_mut::<EquipmentLayer, _>(EquipmentLayer::NAME, |l| l.highlight(id))
            .map(|r| r.unwrap_or(false))
    }

    pub fn set_labels(&self, show: bool) -> Result<(), LayerError> {
        self.manager
            .with_layer_mut::<EquipmentLayer, _>(EquipmentLayer::NAME, |l| l.set_labels(show))
            .map(|_| ())
    }

    /// Change an item's status in the equipment and energy layers.
    ///
    /// The energy overlay picks it up at its next recompute.
    pub fn set_status(&self, id: &str, status: EquipmentStatus) -> Result<bool, LayerError> {
        let shown = self
            .manager
            .with_layer_mut::<EquipmentLayer, _>(EquipmentLayer::NAME, |l| l.set_status(id, status))?
            .unwrap_or(false);
        self.manager
            .with_layer_mut::<EnergyLayer, _>(EnergyLayer::NAME, |l| l.set_status(id, status))?;
        Ok(shown)
    }

    /// Trigger a failure at the current simulated time.
    ///
    /// Failed equipment is also marked failed in the equipment layer.
    pub fn trigger_failure(
        &self,
        id: &str,
        failure_type: Option<FailureType>,
        severity: Severity,
    ) -> Result<Option<FailureEvent>, LayerError> {
        let event = self
            .manager
            .with_layer_mut::<FailureLayer, _>(FailureLayer::NAME, |l| {
                l.simulator_mut().trigger(id, failure_type, severity).cloned()
            })?
            .flatten();
        if event.is_some() {
            self.set_status(id, EquipmentStatus::Failed)?;
        }
        Ok(event)
    }

    pub fn risk_zones(&self) -> Result<Vec<RiskZone>, LayerError> {
        self.manager
            .with_layer::<FailureLayer, _>(FailureLayer::NAME, |l| l.simulator().risk_zones())
            .map(Option::unwrap_or_default)
    }

    pub fn energy_state(&self) -> Result<EnergyState, LayerError> {
        self.manager
            .with_layer::<EnergyLayer, _>(EnergyLayer::NAME, |l| l.state().clone())
            .map(Option::unwrap_or_default)
    }
}
