#![forbid(unsafe_code)]

//! Renderer configuration.
//!
//! Captures every tunable of the render engine as a single [`RendererConfig`]
//! that callers build in code or load from TOML/JSON. The engine never reads
//! configuration from the environment.
//!
//! ```toml
//! width = 120
//! height = 40
//! default_view = "detail"
//! color = true
//!
//! [propagation]
//! step = 0.25
//! max_depth = 4
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ParseViewLevelError};

/// Precision level of a rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLevel {
    /// Schematic building overview (building managers).
    #[default]
    Overview,
    /// System tracing on one floor plan (engineers).
    Detail,
    /// Precise spatial anchors (field technicians).
    Spatial,
}

impl ViewLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Detail => "detail",
            Self::Spatial => "spatial",
        }
    }
}

impl fmt::Display for ViewLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewLevel {
    type Err = ParseViewLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" | "schematic" | "building" => Ok(Self::Overview),
            "detail" | "tracing" | "system" => Ok(Self::Detail),
            "spatial" | "ar" | "anchors" => Ok(Self::Spatial),
            _ => Err(ParseViewLevelError(s.to_string())),
        }
    }
}

/// Impact/probability decay used when modelling failure propagation.
///
/// Step `i` (0-based, counted from the failed equipment) receives
/// `impact = max(floor, base - i * step)`. Propagation stops after
/// `max_depth` steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayModel {
    pub base: f64,
    pub step: f64,
    pub floor: f64,
    pub max_depth: usize,
    /// Simulated delay between consecutive propagation steps.
    pub step_delay_secs: u64,
}

impl Default for DecayModel {
    fn default() -> Self {
        Self {
            base: 1.0,
            step: 0.2,
            floor: 0.1,
            max_depth: 5,
            step_delay_secs: 30,
        }
    }
}

impl DecayModel {
    /// Impact for the `i`-th propagation step, clamped to `[0, 1]`.
    #[inline]
    pub fn impact(&self, i: usize) -> f64 {
        (self.base - i as f64 * self.step).max(self.floor).clamp(0.0, 1.0)
    }

    /// Simulated delay before step `i` is reached.
    #[inline]
    pub fn delay(&self, i: usize) -> Duration {
        Duration::from_secs(self.step_delay_secs.saturating_mul(i as u64 + 1))
    }
}

/// Top-level configuration consumed by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Terminal width in cells.
    pub width: u16,
    /// Terminal height in cells (map area for layered views).
    pub height: u16,
    /// View level used when a request does not name one.
    pub default_view: ViewLevel,
    /// Draw grids/maps (equipment grid, floor map, anchor scatter).
    pub show_grid: bool,
    /// Append symbol legends.
    pub show_legend: bool,
    /// Append status summaries.
    pub show_status: bool,
    /// Emit ANSI colors for status glyphs.
    pub color: bool,
    /// Live-mode refresh period in milliseconds.
    pub refresh_interval_ms: u64,
    /// Live-mode bounded frame queue capacity.
    pub live_queue_capacity: usize,
    /// Energy simulation is recomputed every N animation ticks.
    pub energy_recompute_ticks: u64,
    /// Failure-propagation decay parameters.
    pub propagation: DecayModel,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            default_view: ViewLevel::Overview,
            show_grid: true,
            show_legend: true,
            show_status: true,
            color: false,
            refresh_interval_ms: 1000,
            live_queue_capacity: 4,
            energy_recompute_ticks: 10,
            propagation: DecayModel::default(),
        }
    }
}

impl RendererConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Refresh period for live mode.
    #[inline]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.width < 20 {
            errors.push(format!("width must be >= 20, got {}", self.width));
        }
        if self.height < 5 {
            errors.push(format!("height must be >= 5, got {}", self.height));
        }
        if self.refresh_interval_ms == 0 {
            errors.push("refresh_interval_ms must be > 0".into());
        }
        if self.live_queue_capacity == 0 {
            errors.push("live_queue_capacity must be > 0".into());
        }
        if self.energy_recompute_ticks == 0 {
            errors.push("energy_recompute_ticks must be > 0".into());
        }

        let p = &self.propagation;
        if !(0.0..=1.0).contains(&p.base) {
            errors.push(format!("propagation.base must be in [0, 1], got {}", p.base));
        }
        if p.step < 0.0 {
            errors.push(format!("propagation.step must be >= 0, got {}", p.step));
        }
        if !(0.0..=1.0).contains(&p.floor) {
            errors.push(format!(
                "propagation.floor must be in [0, 1], got {}",
                p.floor
            ));
        }

        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(count = errors.len(), "rejecting invalid renderer config");
            Err(ConfigError::Validation(errors))
        }
    }
}
