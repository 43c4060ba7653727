#![forbid(unsafe_code)]

//! Priority-ordered layer registry.
//!
//! # Locking
//!
//! Layers live behind one `RwLock`. Rendering and queries take the read
//! lock and may run concurrently; registration, removal, visibility changes,
//! and ticks take the write lock. Dirty bookkeeping has its own mutex and is
//! never held while calling into a layer.
//!
//! # Invariants
//!
//! 1. Names are unique; `add_layer` with a taken name fails.
//! 2. Iteration order is ascending `(priority, name)`, independent of
//!    insertion order.
//! 3. `update_all` ticks every layer, visible or not.

use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use ahash::AHashMap;
use bimview_core::geometry::{Bounds, Region};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::compositor::{BlendMode, Compositor};
use bimview_render::dirty::DirtyTracker;

use crate::error::LayerError;
use crate::layer::Layer;

/// Snapshot of a registered layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub priority: i32,
    pub visible: bool,
    pub bounds: Option<Bounds>,
}

impl LayerInfo {
    fn of(layer: &dyn Layer) -> Self {
        Self {
            name: layer.name().to_string(),
            priority: layer.priority(),
            visible: layer.is_visible(),
            bounds: layer.bounds(),
        }
    }
}

type LayerMap = AHashMap<String, Box<dyn Layer>>;

#[derive(Debug, Default)]
struct DirtyState {
    tracker: DirtyTracker,
    /// World bounds changed since the last incremental render.
    pending: Vec<Bounds>,
    last_viewport: Option<Viewport>,
}

/// Caller-owned registry of layers.
#[derive(Default)]
pub struct LayerManager {
    layers: RwLock<LayerMap>,
    dirty: Mutex<DirtyState>,
}

impl std::fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerManager")
            .field("layers", &self.get_layers())
            .finish()
    }
}

fn sorted(map: &LayerMap) -> Vec<&dyn Layer> {
    let mut layers: Vec<&dyn Layer> = map.values().map(|l| l.as_ref()).collect();
    layers.sort_by(|a, b| a.priority().cmp(&b.priority()).then_with(|| a.name().cmp(b.name())));
    layers
}

impl LayerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LayerMap> {
        self.layers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, LayerMap> {
        self.layers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn dirty(&self) -> std::sync::MutexGuard<'_, DirtyState> {
        self.dirty.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a layer.
    pub fn add_layer(&self, layer: Box<dyn Layer>) -> Result<(), LayerError> {
        let name = layer.name().to_string();
        {
            let mut layers = self.write();
            if layers.contains_key(&name) {
                return Err(LayerError::DuplicateName(name));
            }
            tracing::debug!(layer = %name, priority = layer.priority(), "layer added");
            layers.insert(name, layer);
        }
        self.mark_all_dirty();
        Ok(())
    }

    /// Unregister a layer and hand it back.
    pub fn remove_layer(&self, name: &str) -> Result<Box<dyn Layer>, LayerError> {
        let removed = self
            .write()
            .remove(name)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        tracing::debug!(layer = name, "layer removed");
        self.mark_all_dirty();
        Ok(removed)
    }

    /// Snapshot of one layer.
    pub fn get_layer(&self, name: &str) -> Result<LayerInfo, LayerError> {
        self.read()
            .get(name)
            .map(|l| LayerInfo::of(l.as_ref()))
            .ok_or_else(|| LayerError::NotFound(name.to_string()))
    }

    /// Fresh snapshot of all layers, ascending by priority.
    pub fn get_layers(&self) -> Vec<LayerInfo> {
        sorted(&self.read()).into_iter().map(LayerInfo::of).collect()
    }

    /// Show or hide a layer.
    pub fn set_layer_visible(&self, name: &str, visible: bool) -> Result<(), LayerError> {
        {
            let mut layers = self.write();
            let layer = layers
                .get_mut(name)
                .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
            if layer.is_visible() == visible {
                return Ok(());
            }
            layer.set_visible(visible);
        }
        self.mark_all_dirty();
        Ok(())
    }

    /// Run `f` against a layer downcast to its concrete type.
    ///
    /// Returns `Ok(None)` when the layer exists but is not a `T`. The whole
    /// screen is marked dirty since `f` may change anything.
    pub fn with_layer_mut<T, R>(&self, name: &str, f: impl FnOnce(&mut T) -> R) -> Result<Option<R>, LayerError>
    where
        T: Layer + 'static,
    {
        let result = {
            let mut layers = self.write();
            let layer = layers
                .get_mut(name)
                .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
            layer.as_any_mut().downcast_mut::<T>().map(f)
        };
        if result.is_some() {
            self.mark_all_dirty();
        }
        Ok(result)
    }

    /// Read a layer downcast to its concrete type.
    pub fn with_layer<T, R>(&self, name: &str, f: impl FnOnce(&T) -> R) -> Result<Option<R>, LayerError>
    where
        T: Layer + 'static,
    {
        let layers = self.read();
        let layer = layers
            .get(name)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        Ok(layer.as_any().downcast_ref::<T>().map(f))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Draw every visible layer, lowest priority first, into `buf`.
    ///
    /// `buf` is resized to the viewport when the sizes differ.
    pub fn render_all(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        buf.resize(viewport.width, viewport.height);
        let layers = self.read();
        let _span = tracing::debug_span!("render_all", layers = layers.len()).entered();
        for layer in sorted(&layers).into_iter().filter(|l| l.is_visible()) {
            layer.render(buf, viewport);
        }
    }

    /// Advance every layer by one tick, visible or not.
    pub fn update_all(&self, dt: Duration) {
        let mut changed = Vec::new();
        {
            let mut layers = self.write();
            for layer in layers.values_mut() {
                // Old and new extents both need redrawing.
                let before = layer.is_animated().then(|| layer.bounds()).flatten();
                layer.update(dt);
                if layer.is_animated() && layer.is_visible() {
                    changed.extend(before);
                    changed.extend(layer.bounds());
                }
            }
        }
        if !changed.is_empty() {
            self.dirty().pending.extend(changed);
        }
    }

    /// Mark a world-space area as needing redraw.
    pub fn mark_dirty(&self, bounds: Bounds) {
        self.dirty().pending.push(bounds);
    }

    /// Force the next incremental render to redraw everything.
    pub fn mark_all_dirty(&self) {
        let mut dirty = self.dirty();
        dirty.pending.clear();
        dirty.tracker.mark_all();
    }

    /// Redraw only what changed since the last call.
    ///
    /// `buf` must hold the previous frame. Returns the screen regions that
    /// were refreshed; a changed viewport or buffer size refreshes all.
    pub fn render_dirty(&self, buf: &mut CharBuffer, viewport: &Viewport) -> Vec<Region> {
        let regions = {
            let mut dirty = self.dirty();
            let size_changed = buf.width() != viewport.width || buf.height() != viewport.height;
            if size_changed || dirty.last_viewport.as_ref() != Some(viewport) {
                dirty.tracker.mark_all();
                dirty.last_viewport = Some(viewport.clone());
            }
            let pending = std::mem::take(&mut dirty.pending);
            for bounds in pending {
                if let Some(region) = viewport.region_for(&bounds.expand(1.0 / viewport.zoom)) {
                    dirty.tracker.mark(region);
                }
            }
            dirty.tracker.take(viewport.region())
        };
        if regions.is_empty() {
            return regions;
        }

        let mut scratch = CharBuffer::new(viewport.width, viewport.height);
        self.render_all(&mut scratch, viewport);
        buf.resize(viewport.width, viewport.height);
        for region in &regions {
            buf.copy_region_from(&scratch, *region);
        }
        tracing::debug!(regions = regions.len(), "incremental render");
        regions
    }

    /// Render each visible layer into its own buffer and blend them.
    pub fn render_composited(&self, out: &mut CharBuffer, viewport: &Viewport, mode: BlendMode) {
        out.resize(viewport.width, viewport.height);
        let buffers: Vec<CharBuffer> = {
            let layers = self.read();
            sorted(&layers)
                .into_iter()
                .filter(|l| l.is_visible())
                .map(|l| {
                    let mut buf = CharBuffer::new(viewport.width, viewport.height);
                    l.render(&mut buf, viewport);
                    buf
                })
                .collect()
        };
        Compositor::new(mode).composite(&buffers, out);
    }
}
