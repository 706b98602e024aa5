//! End-to-end engine test: trace a sprite, exercise collision queries
//! under transforms, persist the geometry, and confirm the reloaded
//! outline behaves identically.

#![allow(clippy::unwrap_used)]

use image::Rgba;
use siluet_collide::{
    Accuracy, CollisionInfoFlags, Outline, Point, RgbaImage, TraceConfig, trace_outline,
};

fn sprite(width: u32, height: u32, solid_at: impl Fn(u32, u32) -> bool) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if solid_at(x, y) {
            Rgba([200, 180, 90, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// A 12x12 ring sprite: solid square with a 4x4 transparent middle.
fn ring_sprite() -> RgbaImage {
    sprite(12, 12, |x, y| {
        let outer = (1..11).contains(&x) && (1..11).contains(&y);
        let inner = (4..8).contains(&x) && (4..8).contains(&y);
        outer && !inner
    })
}

#[test]
fn traced_ring_keeps_its_hole_out_of_containment() {
    let config = TraceConfig {
        include_holes: true,
        accuracy: Accuracy::High,
        ..TraceConfig::default()
    };
    let outline = trace_outline(&ring_sprite(), &config);

    assert_eq!(outline.contours().len(), 2);
    assert_eq!(outline.contours().iter().filter(|c| c.is_hole()).count(), 1);

    // On the ring material: inside. In the hole: outside.
    assert!(outline.point_inside(Point::new(2.5, 2.5)).unwrap());
    assert!(!outline.point_inside(Point::new(6.0, 6.0)).unwrap());
}

#[test]
fn collision_results_survive_save_and_load() {
    let config = TraceConfig {
        include_holes: true,
        ..TraceConfig::default()
    };
    let original = trace_outline(&ring_sprite(), &config);

    let mut buffer = Vec::new();
    original.save(&mut buffer).unwrap();
    let reloaded = Outline::load(&mut buffer.as_slice()).unwrap();
    assert_eq!(reloaded.contours(), original.contours());

    let probe_sprite = sprite(4, 4, |_, _| true);
    let mut probe = trace_outline(&probe_sprite, &TraceConfig::default());

    // Sweep the probe across the scene; the persisted outline must
    // agree with the traced one at every step.
    let mut contacts = 0;
    for step in 0..24 {
        #[allow(clippy::cast_precision_loss)]
        let x = step as f32 - 4.0;
        probe.set_translation(x, 4.0);
        let expected = original.collide(&probe).unwrap();
        assert_eq!(
            reloaded.collide(&probe).unwrap(),
            expected,
            "divergence at sweep step {step}",
        );
        contacts += u32::from(expected);
    }
    assert!(contacts > 0, "the sweep should cross the ring");
    assert!(contacts < 24, "the sweep should also miss the ring");
}

#[test]
fn symmetry_and_bounding_necessity_hold_across_transforms() {
    let a = trace_outline(
        &sprite(8, 8, |x, y| x.abs_diff(4) + y.abs_diff(4) <= 3),
        &TraceConfig::default(),
    );
    let mut b = trace_outline(&sprite(6, 6, |_, _| true), &TraceConfig::default());

    let placements = [
        (0.0, 0.0, 0.0, 1.0),
        (5.5, 1.0, 0.4, 1.0),
        (9.0, 9.0, 1.2, 0.5),
        (-3.0, 2.0, 2.3, 2.0),
        (14.0, 0.0, 0.0, 1.0),
    ];
    for &(x, y, angle, scale) in &placements {
        b.set_translation(x, y);
        b.set_rotation(angle);
        b.set_scale(scale, scale);

        let forward = a.collide(&b).unwrap();
        let backward = b.collide(&a).unwrap();
        assert_eq!(forward, backward, "asymmetry at placement {x},{y}");

        if forward {
            assert!(
                a.bounding_circle()
                    .unwrap()
                    .overlaps(&b.bounding_circle().unwrap()),
                "contact without bounding-circle overlap at {x},{y}",
            );
        }
    }
}

#[test]
fn detailed_contacts_sit_on_both_boundaries() {
    let mut a = trace_outline(&sprite(6, 6, |_, _| true), &TraceConfig::default());
    a.enable_collision_info(CollisionInfoFlags::ALL);
    let mut b = trace_outline(&sprite(6, 6, |_, _| true), &TraceConfig::default());
    b.set_translation(4.0, 3.0);

    let reports = a.collide_detailed(&b).unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(!report.points.is_empty());
    assert!(report.penetration_depth > 0.0);

    // Every recorded crossing lies on the shared boundary strip of the
    // two squares ([4, 6] x [3, 6] overlap region).
    for cp in &report.points {
        assert!(
            (3.9..=6.1).contains(&cp.point.x) && (2.9..=6.1).contains(&cp.point.y),
            "contact {:?} outside the overlap region",
            cp.point,
        );
        assert!(
            (cp.normal.length() - 1.0).abs() < 1e-4,
            "normals are unit length",
        );
    }
}
