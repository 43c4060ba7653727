#![forbid(unsafe_code)]

//! Facade entry points and the tracing they emit.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use bimview::prelude::*;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Default, Clone)]
struct Captured {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Captured {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans.lock().unwrap().push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.events.lock().unwrap().push(message);
        }
    }
}

fn small_plan() -> FloorPlan {
    FloorPlan {
        building: "HQ".into(),
        floor: "1".into(),
        level: 1,
        rooms: vec![Room::new("r1", "Lab", bimview::Bounds::new(0.0, 0.0, 12.0, 6.0))],
        equipment: vec![
            Equipment::new("p1", "Panel", "panel", Point::new(2.0, 2.0)),
            Equipment::new("o1", "Outlet", "outlet", Point::new(9.0, 2.0)),
        ],
        connections: vec![bimview::Connection::new(
            "c1",
            bimview::ConnectionType::Electrical,
            "p1",
            "o1",
        )],
    }
}

#[test]
fn detail_render_is_traced() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    let out = tracing::subscriber::with_default(subscriber, || {
        bimview::render_once(&RendererConfig::default(), &RenderRequest::floor_plan(small_plan()))
    })
    .unwrap();
    assert!(out.starts_with("System Trace: HQ / Floor 1"));

    let spans = captured.spans.lock().unwrap();
    assert!(spans.iter().any(|s| s == "view_render"));
    let events = captured.events.lock().unwrap();
    assert!(events.iter().any(|e| e == "floor plan view built"));
}

#[test]
fn rejected_request_converts_to_facade_error() {
    let err = bimview::render_once(&RendererConfig::default(), &RenderRequest::new(ViewLevel::Overview))
        .unwrap_err();
    assert!(matches!(err, Error::Render(_)));
    assert_eq!(err.to_string(), "overview view requires building data");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn router_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "width = 40\nheight = 12\nshow_legend = false").unwrap();
    let router = bimview::router_from_file(file.path()).unwrap();
    assert_eq!(router.config().width, 40);
    assert!(!router.config().show_legend);

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    writeln!(bad, "width = 0").unwrap();
    assert!(matches!(bimview::router_from_file(bad.path()), Err(Error::Config(_))));
}

#[test]
fn live_monitor_through_facade() {
    let source = CancelSource::new();
    let router = ViewRouter::new(RendererConfig {
        refresh_interval_ms: 10,
        ..RendererConfig::default()
    });
    let monitor =
        bimview::spawn_live(router, RenderRequest::floor_plan(small_plan()), source.token()).unwrap();
    let frame = monitor.next_timeout(std::time::Duration::from_secs(5)).unwrap();
    source.cancel();
    assert!(frame.contains("frame 1\nSystem Trace: HQ / Floor 1"));
    monitor.join();
}
