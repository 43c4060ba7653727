//! Property tests for the view renderers.

use bimview_core::config::RendererConfig;
use bimview_core::geometry::Point;
use bimview_core::model::{Equipment, EquipmentStatus, Floor, SpatialAnchor};
use bimview_views::{RenderRequest, ViewRouter};
use proptest::prelude::*;

fn anchor_strategy() -> impl Strategy<Value = SpatialAnchor> {
    (
        "[A-Z]{1,4}",
        -3i32..5,
        -1e6f64..1e6,
        -1e6f64..1e6,
        -50.0f64..50.0,
        prop_oneof![Just("ARKit"), Just("ARCore"), Just("LiDAR")],
    )
        .prop_map(|(name, floor, x, y, z, platform)| SpatialAnchor {
            id: name.clone(),
            equipment_path: format!("/HQ/{floor}/ELEC/{name}"),
            floor,
            x,
            y,
            z,
            platform: platform.to_string(),
        })
}

fn status_strategy() -> impl Strategy<Value = EquipmentStatus> {
    prop::sample::select(EquipmentStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn spatial_lists_every_matching_anchor(
        anchors in prop::collection::vec(anchor_strategy(), 0..40),
        floor in prop::option::of(-3i32..5),
        width in 10u16..120,
        height in 4u16..50,
    ) {
        let config = RendererConfig { width, height, ..RendererConfig::default() };
        let mut request = RenderRequest::anchors(anchors.clone());
        if let Some(level) = floor {
            request = request.with_floor(level);
        }
        let out = ViewRouter::new(config).render(&request).unwrap();
        let expected = anchors.iter().filter(|a| floor.is_none_or(|f| a.floor == f)).count();
        let header = format!("Spatial Anchors: {expected} of {}", anchors.len());
        prop_assert!(out.starts_with(&header));
        if expected == 0 {
            prop_assert!(out.ends_with("No anchors match\n"));
        } else {
            prop_assert!(out.contains("Platforms:"));
        }
    }

    #[test]
    fn overview_counts_all_equipment(
        items in prop::collection::vec((-500i32..500, -500i32..500, status_strategy()), 0..60),
        width in 10u16..120,
        height in 4u16..50,
    ) {
        let equipment: Vec<Equipment> = items
            .iter()
            .enumerate()
            .map(|(i, &(x, y, status))| {
                Equipment::new(format!("e{i}"), format!("Item {i}"), "outlet", Point::new(f64::from(x), f64::from(y)))
                    .with_status(status)
            })
            .collect();
        let building = bimview_core::model::Building {
            id: "b".into(),
            name: "B".into(),
            floors: vec![Floor { level: 0, name: "G".into(), rooms: Vec::new(), equipment }],
        };
        let config = RendererConfig { width, height, ..RendererConfig::default() };
        let out = ViewRouter::new(config).render(&RenderRequest::building(building)).unwrap();
        let header = format!("Floors: 1 | Equipment: {}", items.len());
        prop_assert!(out.contains(&header));
    }
}
