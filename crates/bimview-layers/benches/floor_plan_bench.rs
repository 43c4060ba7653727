//! Benchmarks for floor plan rendering.
//!
//! Run with: cargo bench -p bimview-layers

use std::hint::black_box;
use std::time::Duration;

use bimview_core::config::RendererConfig;
use bimview_core::geometry::{Bounds, Point};
use bimview_core::model::{Connection, ConnectionType, Equipment, FloorPlan, Room};
use bimview_layers::{FloorPlanView, Severity};
use bimview_render::buffer::CharBuffer;
use bimview_render::compositor::BlendMode;
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

const TYPES: &[&str] = &["outlet", "light", "sensor", "hvac", "camera", "switch"];

/// A grid of `n x n` rooms, each with one fed device.
fn make_plan(n: usize) -> FloorPlan {
    let mut rooms = Vec::with_capacity(n * n);
    let mut equipment = vec![Equipment::new("main", "Main panel", "panel", Point::new(0.0, 0.0))];
    let mut connections = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let i = row * n + col;
            let (x, y) = (col as f64 * 12.0, row as f64 * 8.0);
            rooms.push(Room::new(format!("r{i}"), format!("Room {i}"), Bounds::new(x, y, x + 12.0, y + 8.0)));
            let id = format!("e{i}");
            equipment.push(Equipment::new(
                &id,
                format!("Device {i}"),
                TYPES[i % TYPES.len()],
                Point::new(x + 6.0, y + 4.0),
            ));
            connections.push(
                Connection::new(format!("c{i}"), ConnectionType::Electrical, "main", &id)
                    .with_load((i % 10) as f64 * 10.0, 100.0)
                    .with_active(true),
            );
        }
    }
    FloorPlan {
        building: "Bench".into(),
        floor: "1".into(),
        level: 1,
        rooms,
        equipment,
        connections,
    }
}

fn config() -> RendererConfig {
    RendererConfig {
        width: 160,
        height: 48,
        ..RendererConfig::default()
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("floor_plan/build");
    for n in [2, 5, 10] {
        let plan = make_plan(n);
        group.bench_with_input(BenchmarkId::from_parameter(n * n), &plan, |b, plan| {
            b.iter(|| black_box(FloorPlanView::new(plan, &config())))
        });
    }
    group.finish();
}

fn bench_full_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("floor_plan/render_all");
    for n in [2, 5, 10] {
        let view = FloorPlanView::new(&make_plan(n), &config()).expect("view");
        view.trigger_failure("e0", None, Severity::Major).expect("trigger");
        group.bench_function(BenchmarkId::from_parameter(n * n), |b| {
            b.iter(|| black_box(view.render()))
        });
    }
    group.finish();
}

fn bench_incremental_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("floor_plan/render_dirty");
    for n in [2, 5, 10] {
        let view = FloorPlanView::new(&make_plan(n), &config()).expect("view");
        group.bench_function(BenchmarkId::from_parameter(n * n), |b| {
            b.iter_batched(
                || {
                    let mut buf = CharBuffer::new(160, 48);
                    view.render_into(&mut buf);
                    view.tick(Duration::from_millis(100));
                    buf
                },
                |mut buf| black_box(view.render_into(&mut buf)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_composited(c: &mut Criterion) {
    let mut group = c.benchmark_group("floor_plan/composite");
    let view = FloorPlanView::new(&make_plan(5), &config()).expect("view");
    for mode in [BlendMode::Overlay, BlendMode::Additive, BlendMode::Priority] {
        group.bench_function(format!("{mode:?}"), |b| {
            let mut out = CharBuffer::new(160, 48);
            b.iter(|| {
                view.manager().render_composited(&mut out, view.viewport(), mode);
                black_box(&out);
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_full_render,
    bench_incremental_tick,
    bench_composited
);
criterion_main!(benches);
