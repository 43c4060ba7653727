#![forbid(unsafe_code)]

//! Failure events, cascading propagation, risk zones, and their overlay.
//!
//! Time is simulated: the [`FailureSimulator`] owns a clock that only moves
//! when [`FailureSimulator::advance`] is called, so tests and replays are
//! deterministic and nothing ever sleeps.
//!
//! # Invariants
//!
//! 1. An event is active exactly while `now - start < duration`.
//! 2. Propagation steps are in breadth-first order from the failed item;
//!    impact and probability never increase along the path.
//! 3. A path never revisits an item and never exceeds `DecayModel::max_depth`
//!    steps.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use bimview_core::config::DecayModel;
use bimview_core::geometry::{Bounds, Point};
use bimview_core::model::{Connection, Equipment};
use bimview_core::viewport::Viewport;
use bimview_render::buffer::CharBuffer;
use bimview_render::compositor::{GlyphCategory, categorize};
use bimview_render::raster::{BandGlyphs, draw_line_with, fill_zone_where, intensity_glyph};

use crate::layer::{Layer, LayerMeta, layer_meta_methods, priority};

const HOUR: Duration = Duration::from_secs(3600);

/// How bad a failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Minor, Self::Moderate, Self::Major, Self::Critical];

    /// How long an event of this severity stays active.
    pub const fn duration(self) -> Duration {
        match self {
            Self::Minor => Duration::from_secs(30 * 60),
            Self::Moderate => HOUR,
            Self::Major => Duration::from_secs(2 * 3600),
            Self::Critical => Duration::from_secs(4 * 3600),
        }
    }

    /// Scales step impact into propagation probability.
    pub const fn probability_factor(self) -> f64 {
        match self {
            Self::Minor => 0.3,
            Self::Moderate => 0.5,
            Self::Major => 0.7,
            Self::Critical => 0.9,
        }
    }

    /// Risk-zone radius in world units.
    pub const fn zone_radius(self) -> f64 {
        match self {
            Self::Minor => 2.0,
            Self::Moderate => 3.0,
            Self::Major => 5.0,
            Self::Critical => 8.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureType {
    Electrical,
    Mechanical,
    Thermal,
    Network,
    Water,
    Fire,
}

impl FailureType {
    /// Marker glyph.
    pub const fn glyph(self) -> char {
        match self {
            Self::Electrical => 'ϟ',
            Self::Mechanical => '✱',
            Self::Thermal => '✹',
            Self::Network => '✕',
            Self::Water => '✦',
            Self::Fire => '▲',
        }
    }

    /// Most likely failure type for an equipment type.
    pub fn infer(equipment_type: &str) -> Self {
        let t = equipment_type.to_ascii_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| t.contains(k));
        if has(&["fire", "smoke", "sprinkler"]) {
            Self::Fire
        } else if has(&["pump", "valve", "water", "pipe", "plumb"]) {
            Self::Water
        } else if has(&["hvac", "ahu", "vav", "chiller", "boiler", "thermostat"]) {
            Self::Thermal
        } else if has(&["network", "switch", "router", "server", "camera", "access_point"]) {
            Self::Network
        } else if has(&["motor", "fan", "elevator", "door"]) {
            Self::Mechanical
        } else {
            Self::Electrical
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electrical => "electrical",
            Self::Mechanical => "mechanical",
            Self::Thermal => "thermal",
            Self::Network => "network",
            Self::Water => "water",
            Self::Fire => "fire",
        }
    }
}

/// Alert glyph alternating with the type glyph for severe failures.
pub const ALERT_GLYPH: char = '!';

/// One downstream item a failure may spread to.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationStep {
    pub equipment_id: String,
    pub position: Point,
    /// Upstream item the failure reaches this one through.
    pub from_id: String,
    pub from_position: Point,
    /// Simulated delay after the failure start.
    pub delay: Duration,
    /// In `[0, 1]`.
    pub impact: f64,
    /// In `[0, 1]`.
    pub probability: f64,
}

/// A failure and its modelled cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEvent {
    pub equipment_id: String,
    pub position: Point,
    pub failure_type: FailureType,
    pub severity: Severity,
    /// Simulated start time.
    pub start: Duration,
    pub duration: Duration,
    pub propagation: Vec<PropagationStep>,
    pub active: bool,
}

impl FailureEvent {
    /// Whether the event is active at simulated time `now`.
    #[inline]
    pub fn is_active_at(&self, now: Duration) -> bool {
        now >= self.start && now - self.start < self.duration
    }

    /// Simulated time at which the event ends.
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }

    /// Marker glyph for an animation frame.
    ///
    /// Critical failures flash every other frame, major ones every third;
    /// lesser ones are steady.
    pub fn marker_glyph(&self, frame: u64) -> char {
        let cycle = match self.severity {
            Severity::Critical => 2,
            Severity::Major => 3,
            Severity::Moderate | Severity::Minor => return self.failure_type.glyph(),
        };
        if frame % cycle == cycle - 1 {
            ALERT_GLYPH
        } else {
            self.failure_type.glyph()
        }
    }
}

/// A circular area at risk from active failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskZone {
    pub center: Point,
    pub radius: f64,
    /// In `[0, 1]`.
    pub risk_level: f64,
    pub failure_types: Vec<FailureType>,
    /// Equipment within the radius, nearest first.
    pub equipment: Vec<String>,
    pub last_updated: Duration,
}

/// Monotonic simulated clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    now: Duration,
}

impl SimClock {
    #[inline]
    pub const fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Triggers failures and models how they spread through connections.
#[derive(Debug, Clone)]
pub struct FailureSimulator {
    clock: SimClock,
    decay: DecayModel,
    positions: AHashMap<String, Point>,
    types: AHashMap<String, String>,
    downstream: AHashMap<String, Vec<String>>,
    events: Vec<FailureEvent>,
}

impl FailureSimulator {
    pub fn new(equipment: &[Equipment], connections: &[Connection], decay: DecayModel) -> Self {
        let mut downstream: AHashMap<String, Vec<String>> = AHashMap::new();
        for c in connections {
            downstream.entry(c.from_id.clone()).or_default().push(c.to_id.clone());
        }
        Self {
            clock: SimClock::default(),
            decay,
            positions: equipment.iter().map(|e| (e.id.clone(), e.location)).collect(),
            types: equipment
                .iter()
                .map(|e| (e.id.clone(), e.equipment_type.clone()))
                .collect(),
            downstream,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn decay(&self) -> &DecayModel {
        &self.decay
    }

    pub fn events(&self) -> &[FailureEvent] {
        &self.events
    }

    pub fn active_events(&self) -> impl Iterator<Item = &FailureEvent> {
        self.events.iter().filter(|e| e.active)
    }

    /// Start a failure at the current simulated time.
    ///
    /// The failure type is inferred from the equipment type when `None`.
    /// Returns `None` for unknown equipment.
    pub fn trigger(
        &mut self,
        equipment_id: &str,
        failure_type: Option<FailureType>,
        severity: Severity,
    ) -> Option<&FailureEvent> {
        let position = *self.positions.get(equipment_id)?;
        let failure_type = failure_type.unwrap_or_else(|| {
            self.types
                .get(equipment_id)
                .map_or(FailureType::Electrical, |t| FailureType::infer(t))
        });
        let propagation = self.propagation_path(equipment_id, severity);
        tracing::debug!(
            equipment = equipment_id,
            severity = severity.as_str(),
            steps = propagation.len(),
            "failure triggered"
        );
        self.events.push(FailureEvent {
            equipment_id: equipment_id.to_string(),
            position,
            failure_type,
            severity,
            start: self.clock.now(),
            duration: severity.duration(),
            propagation,
            active: true,
        });
        self.events.last()
    }

    /// Downstream cascade from `equipment_id`, breadth-first.
    ///
    /// Each step records the parent edge it was reached through. Empty for
    /// unknown equipment.
    pub fn propagation_path(&self, equipment_id: &str, severity: Severity) -> Vec<PropagationStep> {
        let mut steps = Vec::new();
        let mut seen: AHashSet<&str> = AHashSet::new();
        seen.insert(equipment_id);
        let mut queue: VecDeque<&str> = VecDeque::from([equipment_id]);

        while let Some(node) = queue.pop_front() {
            let Some(&from_position) = self.positions.get(node) else {
                continue;
            };
            for next in self.downstream.get(node).into_iter().flatten() {
                if steps.len() >= self.decay.max_depth {
                    return steps;
                }
                if !seen.insert(next.as_str()) {
                    continue;
                }
                let Some(&position) = self.positions.get(next) else {
                    continue;
                };
                let i = steps.len();
                let impact = self.decay.impact(i);
                steps.push(PropagationStep {
                    equipment_id: next.clone(),
                    position,
                    from_id: node.to_string(),
                    from_position,
                    delay: self.decay.delay(i),
                    impact,
                    probability: (impact * severity.probability_factor()).clamp(0.0, 1.0),
                });
                queue.push_back(next.as_str());
            }
        }
        steps
    }

    /// Advance simulated time and expire finished events.
    pub fn advance(&mut self, dt: Duration) {
        self.clock.advance(dt);
        let now = self.clock.now();
        for event in &mut self.events {
            let active = event.is_active_at(now);
            if event.active && !active {
                tracing::debug!(equipment = %event.equipment_id, "failure expired");
            }
            event.active = active;
        }
    }

    /// Drop expired events.
    pub fn prune(&mut self) {
        self.events.retain(|e| e.active);
    }

    /// One risk zone per active event.
    pub fn risk_zones(&self) -> Vec<RiskZone> {
        self.active_events()
            .map(|event| {
                let radius = event.severity.zone_radius();
                let mut inside: Vec<(f64, &String)> = self
                    .positions
                    .iter()
                    .map(|(id, p)| (p.distance_sq(&event.position), id))
                    .filter(|(d, _)| *d <= radius * radius)
                    .collect();
                inside.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
                RiskZone {
                    center: event.position,
                    radius,
                    risk_level: event.severity.probability_factor(),
                    failure_types: vec![event.failure_type],
                    equipment: inside.into_iter().map(|(_, id)| id.clone()).collect(),
                    last_updated: self.clock.now(),
                }
            })
            .collect()
    }
}

/// Risk zones, failure markers, and propagation paths.
#[derive(Debug, Clone)]
pub struct FailureLayer {
    meta: LayerMeta,
    simulator: FailureSimulator,
    frame: u64,
}

impl FailureLayer {
    pub const NAME: &'static str = "failure";

    pub fn new(simulator: FailureSimulator) -> Self {
        Self {
            meta: LayerMeta::new(Self::NAME, priority::FAILURE),
            simulator,
            frame: 0,
        }
    }

    pub fn simulator(&self) -> &FailureSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut FailureSimulator {
        &mut self.simulator
    }
}

impl Layer for FailureLayer {
    layer_meta_methods!();

    fn render(&self, buf: &mut CharBuffer, viewport: &Viewport) {
        for zone in self.simulator.risk_zones() {
            let (cx, cy) = viewport.project(zone.center);
            // Zones shade open floor only; walls and devices stay readable.
            fill_zone_where(buf, cx, cy, zone.radius * viewport.zoom, &BandGlyphs::SHADE, |c| {
                matches!(categorize(c), GlyphCategory::Blank | GlyphCategory::Fill)
            });
        }

        for event in self.simulator.active_events() {
            let (x, y) = viewport.project(event.position);
            buf.set_signed(x, y, event.marker_glyph(self.frame));
        }

        // One line per parent edge; endpoints keep their equipment glyphs.
        for step in self.simulator.active_events().flat_map(|e| &e.propagation) {
            let from = viewport.project(step.from_position);
            let to = viewport.project(step.position);
            let glyph = intensity_glyph(step.impact);
            draw_line_with(buf, from, to, |_, x, y| {
                ((x, y) != from && (x, y) != to).then_some(glyph)
            });
        }
    }

    fn update(&mut self, dt: Duration) {
        self.simulator.advance(dt);
        self.frame = self.frame.wrapping_add(1);
    }

    fn bounds(&self) -> Option<Bounds> {
        self.simulator
            .active_events()
            .flat_map(|e| {
                let zone = Bounds::from_point(e.position).expand(e.severity.zone_radius());
                std::iter::once(zone).chain(e.propagation.iter().map(|s| Bounds::from_point(s.position)))
            })
            .reduce(|a, b| a.union(&b))
    }

    fn is_animated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use bimview_core::model::ConnectionType;

    use super::*;

    fn chain(n: usize) -> (Vec<Equipment>, Vec<Connection>) {
        let equipment = (0..n)
            .map(|i| Equipment::new(format!("e{i}"), format!("E{i}"), "outlet", Point::new(i as f64 * 4.0, 2.0)))
            .collect();
        let connections = (1..n)
            .map(|i| {
                Connection::new(
                    format!("c{i}"),
                    ConnectionType::Electrical,
                    format!("e{}", i - 1),
                    format!("e{i}"),
                )
            })
            .collect();
        (equipment, connections)
    }

    fn simulator(n: usize) -> FailureSimulator {
        let (equipment, connections) = chain(n);
        FailureSimulator::new(&equipment, &connections, DecayModel::default())
    }

    #[test]
    fn critical_event_lasts_exactly_four_hours() {
        let mut sim = simulator(2);
        sim.advance(Duration::from_secs(10));
        let start = sim.trigger("e0", None, Severity::Critical).unwrap().start;
        assert_eq!(start, Duration::from_secs(10));

        sim.advance(Duration::from_secs(4 * 3600 - 1));
        assert!(sim.events()[0].active);
        sim.advance(Duration::from_secs(1));
        assert!(!sim.events()[0].active);
        assert_eq!(sim.now(), start + Duration::from_secs(4 * 3600));
    }

    #[test]
    fn durations_scale_with_severity() {
        let hours: Vec<f64> = Severity::ALL
            .iter()
            .map(|s| s.duration().as_secs_f64() / 3600.0)
            .collect();
        assert_eq!(hours, vec![0.5, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn propagation_decays_and_caps_depth() {
        let sim = simulator(10);
        let steps = sim.propagation_path("e0", Severity::Major);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].equipment_id, "e1");
        assert!((steps[0].impact - 1.0).abs() < 1e-9);
        assert!((steps[0].probability - 0.7).abs() < 1e-9);
        assert_eq!(steps[2].delay, Duration::from_secs(90));
        for pair in steps.windows(2) {
            assert!(pair[1].impact <= pair[0].impact);
            assert!(pair[1].probability <= pair[0].probability);
        }
    }

    #[test]
    fn propagation_handles_cycles() {
        let (equipment, mut connections) = chain(3);
        connections.push(Connection::new("loop", ConnectionType::Electrical, "e2", "e0"));
        let sim = FailureSimulator::new(&equipment, &connections, DecayModel::default());
        let ids: Vec<_> = sim
            .propagation_path("e0", Severity::Minor)
            .into_iter()
            .map(|s| s.equipment_id)
            .collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn unknown_equipment_is_not_triggered() {
        let mut sim = simulator(2);
        assert!(sim.trigger("ghost", None, Severity::Minor).is_none());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn risk_zone_lists_nearby_equipment() {
        let mut sim = simulator(4);
        sim.trigger("e1", Some(FailureType::Fire), Severity::Major);
        let zones = sim.risk_zones();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].radius, 5.0);
        assert_eq!(zones[0].equipment, vec!["e1", "e0", "e2"]);
        assert_eq!(zones[0].failure_types, vec![FailureType::Fire]);
    }

    #[test]
    fn marker_flashes_for_critical() {
        let mut sim = simulator(1);
        sim.trigger("e0", Some(FailureType::Electrical), Severity::Critical);
        let event = &sim.events()[0];
        assert_eq!(event.marker_glyph(0), 'ϟ');
        assert_eq!(event.marker_glyph(1), ALERT_GLYPH);
        let mut minor = event.clone();
        minor.severity = Severity::Minor;
        assert_eq!(minor.marker_glyph(1), 'ϟ');
    }

    #[test]
    fn layer_draws_zone_marker_and_path() {
        let mut sim = simulator(3);
        sim.trigger("e0", Some(FailureType::Network), Severity::Minor);
        let layer = FailureLayer::new(sim);
        let mut buf = CharBuffer::new(12, 5);
        layer.render(&mut buf, &Viewport::new(12, 5));
        assert_eq!(buf.get(0, 2), Some('✕'));
        // Path e0 -> e1 at full impact, e1 -> e2 at 0.8.
        assert_eq!(buf.get(2, 2), Some('█'));
        assert_eq!(buf.get(6, 2), Some('█'));
        assert_eq!(buf.get(0, 0), Some('░'));
    }

    #[test]
    fn inference_from_type() {
        assert_eq!(FailureType::infer("Fire Alarm Panel"), FailureType::Fire);
        assert_eq!(FailureType::infer("chilled water pump"), FailureType::Water);
        assert_eq!(FailureType::infer("network switch"), FailureType::Network);
        assert_eq!(FailureType::infer("outlet"), FailureType::Electrical);
    }

    fn fan_out() -> FailureSimulator {
        let equipment = vec![
            Equipment::new("root", "Main", "electrical_panel", Point::new(1.0, 5.0)),
            Equipment::new("a", "North", "outlet", Point::new(20.0, 1.0)),
            Equipment::new("b", "South", "outlet", Point::new(20.0, 9.0)),
        ];
        let connections = vec![
            Connection::new("ca", ConnectionType::Electrical, "root", "a"),
            Connection::new("cb", ConnectionType::Electrical, "root", "b"),
        ];
        FailureSimulator::new(&equipment, &connections, DecayModel::default())
    }

    #[test]
    fn steps_record_their_parent_edge() {
        let (equipment, mut connections) = chain(3);
        connections.push(Connection::new("side", ConnectionType::Electrical, "e0", "e2"));
        let sim = FailureSimulator::new(&equipment, &connections, DecayModel::default());
        let edges: Vec<_> = sim
            .propagation_path("e0", Severity::Minor)
            .into_iter()
            .map(|s| (s.from_id, s.equipment_id))
            .collect();
        assert_eq!(edges, vec![("e0".into(), "e1".into()), ("e0".into(), "e2".into())]);
        assert!(sim.propagation_path("ghost", Severity::Minor).is_empty());
    }

    #[test]
    fn fan_out_draws_each_parent_edge() {
        let mut sim = fan_out();
        sim.trigger("root", Some(FailureType::Electrical), Severity::Minor);
        let steps = &sim.events()[0].propagation;
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.from_id == "root" && s.from_position == Point::new(1.0, 5.0)));

        let layer = FailureLayer::new(sim);
        let mut buf = CharBuffer::new(24, 11);
        layer.render(&mut buf, &Viewport::new(24, 11));
        // No sibling-to-sibling segment between the two leaves.
        for y in 2..=8 {
            assert_eq!(buf.get(20, y), Some(' '), "row {y}");
        }
        // Midpoints of root -> a and root -> b carry the full-impact shade.
        assert_eq!(buf.get(10, 3), Some('█'));
        assert_eq!(buf.get(10, 7), Some('█'));
        assert_eq!(buf.get(20, 1), Some(' '));
        assert_eq!(buf.get(20, 9), Some(' '));
    }
}
