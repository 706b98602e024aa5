//! Pairwise outline collision testing.
//!
//! A test runs through ordered short-circuit gates: world bounding
//! circles, optionally the oriented bounding boxes, optionally a
//! whole-containment check per contour pair, then sub-circle pruning
//! and exact segment intersection inside surviving sub-circle pairs.
//! Plain [`Outline::collide`] stops at the first confirmed contact;
//! [`Outline::collide_detailed`] enumerates every colliding contour
//! pair and records contact geometry according to the outline's
//! [`CollisionInfoFlags`].

use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::geometry::segment_intersection;
use crate::outline::Outline;
use crate::types::{OutlineError, Point};

/// Which contact details [`Outline::collide_detailed`] records.
///
/// Everything defaults to off: the cheapest configuration, where tests
/// stop at the first confirmed contact and report bare contour pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionInfoFlags {
    /// Record the world-space crossing position of each contact.
    pub points: bool,
    /// Record the unit normal of the other contour's crossed edge.
    pub normals: bool,
    /// Record edge indices and the entry/exit classification.
    pub metadata: bool,
    /// Reconstruct penetration depth, normal, and deepest points per
    /// colliding contour pair. Requires `points` and `metadata`, which
    /// supply the crossing geometry the reconstruction walks.
    pub penetration_depth: bool,
}

impl CollisionInfoFlags {
    /// Every detail enabled.
    pub const ALL: Self = Self {
        points: true,
        normals: true,
        metadata: true,
        penetration_depth: true,
    };

    /// Returns `true` if any detail is requested.
    #[must_use]
    pub const fn any(self) -> bool {
        self.points || self.normals || self.metadata || self.penetration_depth
    }
}

/// One boundary crossing between two contours.
///
/// Fields are populated according to the [`CollisionInfoFlags`] in
/// effect; unpopulated fields keep their default values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionPoint {
    /// Where the two edges cross, in world space.
    pub point: Point,
    /// Unit normal of the second contour's crossed edge.
    pub normal: Point,
    /// `true` if the second contour's boundary enters the first
    /// contour's interior here, `false` if it exits. Every closed
    /// crossing region produces one entry and one exit.
    pub is_entry: bool,
    /// Start point index of the crossed edge on the first contour.
    pub contour1_line_start: usize,
    /// End point index (wrap-aware) of the crossed edge on the first
    /// contour.
    pub contour1_line_end: usize,
    /// Start point index of the crossed edge on the second contour.
    pub contour2_line_start: usize,
    /// End point index (wrap-aware) of the crossed edge on the second
    /// contour.
    pub contour2_line_end: usize,
}

/// Direction of a pure-containment contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The first outline's contour lies wholly inside the second's.
    FirstInsideSecond,
    /// The second outline's contour lies wholly inside the first's.
    SecondInsideFirst,
}

/// Contact report for one pair of contours that collided.
///
/// Contours are referenced by index into the two outlines' contour
/// lists: `contour1` into the outline the test was called on, and
/// `contour2` into the other outline.
#[derive(Debug, Clone, PartialEq)]
pub struct CollidingContours {
    /// Contour index in the first outline.
    pub contour1: usize,
    /// Contour index in the second outline.
    pub contour2: usize,
    /// Set when the contact is one contour wholly containing the other
    /// (no boundary crossings; `points` is empty).
    pub containment: Option<Containment>,
    /// Boundary crossings, in discovery order.
    pub points: Vec<CollisionPoint>,
    /// Common normal of the overlap, pointing out of the second
    /// contour; set when penetration depth is requested.
    pub penetration_normal: Point,
    /// How far along the penetration normal the contours interpenetrate.
    pub penetration_depth: f32,
    /// The first contour's point deepest inside the second.
    pub contour1_deep_point: Point,
    /// The second contour's point deepest inside the first.
    pub contour2_deep_point: Point,
}

impl CollidingContours {
    fn new(contour1: usize, contour2: usize) -> Self {
        Self {
            contour1,
            contour2,
            containment: None,
            points: Vec::new(),
            penetration_normal: Point::ZERO,
            penetration_depth: 0.0,
            contour1_deep_point: Point::ZERO,
            contour2_deep_point: Point::ZERO,
        }
    }
}

impl Outline {
    /// Test whether two outlines overlap, stopping at the first
    /// confirmed contact.
    ///
    /// Symmetric: `a.collide(&b)` equals `b.collide(&a)`. Outlines with
    /// no contours (or no points) never collide.
    ///
    /// # Errors
    ///
    /// [`OutlineError::InvalidState`] if either outline was never
    /// prepared.
    pub fn collide(&self, other: &Self) -> Result<bool, OutlineError> {
        Ok(!collide_impl(self, other, None)?.is_empty())
    }

    /// Exhaustively find every colliding contour pair, recording
    /// contact detail per this outline's [`CollisionInfoFlags`].
    ///
    /// The whole-containment check (when enabled via
    /// [`set_inside_test`](Self::set_inside_test) on either outline)
    /// tests one representative vertex plus bounding-circle
    /// containment. For concave contours this can miss containment that
    /// a full test would find — a deliberate, cheap approximation kept
    /// from the original engine.
    ///
    /// # Errors
    ///
    /// [`OutlineError::InvalidState`] if either outline was never
    /// prepared.
    pub fn collide_detailed(&self, other: &Self) -> Result<Vec<CollidingContours>, OutlineError> {
        collide_impl(self, other, Some(self.collision_info()))
    }
}

/// Staged collision test.
///
/// `collect` is `None` for the boolean fast path: the first contact
/// returns immediately with a single bare report, which the caller
/// reduces to `true`.
fn collide_impl(
    a: &Outline,
    b: &Outline,
    collect: Option<CollisionInfoFlags>,
) -> Result<Vec<CollidingContours>, OutlineError> {
    a.ensure_prepared()?;
    b.ensure_prepared()?;

    let mut reports = Vec::new();
    if a.contours().is_empty() || b.contours().is_empty() {
        return Ok(reports);
    }

    let world_a = a.world();
    let world_b = b.world();

    // Stage 1: bounding circles. The one mandatory rejection test.
    if !world_a.bounding.overlaps(&world_b.bounding) {
        return Ok(reports);
    }

    // Stage 2: oriented bounding boxes, when either side asks for it.
    if (a.obb_test() || b.obb_test())
        && let (Some(obb_a), Some(obb_b)) = (a.world_obb(), b.world_obb())
        && !obb_a.overlaps(obb_b)
    {
        return Ok(reports);
    }

    let inside_enabled = a.inside_test() || b.inside_test();
    let collecting = collect.is_some();
    let flags = collect.unwrap_or_default();

    for (i, contour_a) in world_a.contours.iter().enumerate() {
        for (j, contour_b) in world_b.contours.iter().enumerate() {
            // Stage 3: whole containment. A contained contour has no
            // boundary crossings, so the pair is done either way.
            if inside_enabled
                && let Some(direction) = containment(contour_a, contour_b)
            {
                let mut report = CollidingContours::new(i, j);
                report.containment = Some(direction);
                reports.push(report);
                if !collecting {
                    return Ok(reports);
                }
                continue;
            }

            // Stages 4-5: sub-circle pruning, then exact edge tests.
            let mut report = CollidingContours::new(i, j);
            let mut hit = false;
            for sub_a in contour_a.sub_circles() {
                for sub_b in contour_b.sub_circles() {
                    if !sub_a.circle.overlaps(&sub_b.circle) {
                        continue;
                    }
                    let points_a = contour_a.points();
                    let points_b = contour_b.points();
                    for edge_a in sub_a.start..sub_a.end {
                        let a0 = edge_a % points_a.len();
                        let a1 = (edge_a + 1) % points_a.len();
                        for edge_b in sub_b.start..sub_b.end {
                            let b0 = edge_b % points_b.len();
                            let b1 = (edge_b + 1) % points_b.len();
                            if !edge_boxes_overlap(
                                points_a[a0],
                                points_a[a1],
                                points_b[b0],
                                points_b[b1],
                            ) {
                                continue;
                            }
                            let Some(crossing) = segment_intersection(
                                points_a[a0],
                                points_a[a1],
                                points_b[b0],
                                points_b[b1],
                            ) else {
                                continue;
                            };
                            hit = true;
                            if !collecting {
                                // Stage 6: first contact wins.
                                reports.push(CollidingContours::new(i, j));
                                return Ok(reports);
                            }
                            report.points.push(collision_point(
                                flags,
                                crossing.point,
                                points_a,
                                points_b,
                                (a0, a1),
                                (b0, b1),
                            ));
                        }
                    }
                }
            }
            if hit {
                reports.push(report);
            }
        }
    }

    if flags.penetration_depth && flags.points && flags.metadata {
        calculate_penetration_depth(&mut reports, &world_a.contours, &world_b.contours);
    }

    Ok(reports)
}

/// Axis-aligned bounding box rejection for a single edge pair.
fn edge_boxes_overlap(a0: Point, a1: Point, b0: Point, b1: Point) -> bool {
    let (left_a, right_a) = (a0.x.min(a1.x), a0.x.max(a1.x));
    let (top_a, bottom_a) = (a0.y.min(a1.y), a0.y.max(a1.y));
    let (left_b, right_b) = (b0.x.min(b1.x), b0.x.max(b1.x));
    let (top_b, bottom_b) = (b0.y.min(b1.y), b0.y.max(b1.y));
    left_b <= right_a && right_b >= left_a && top_b <= bottom_a && bottom_b >= top_a
}

/// Build one contact record, populating only the requested fields.
fn collision_point(
    flags: CollisionInfoFlags,
    location: Point,
    points_a: &[Point],
    points_b: &[Point],
    (a0, a1): (usize, usize),
    (b0, b1): (usize, usize),
) -> CollisionPoint {
    let mut cp = CollisionPoint::default();
    if flags.points {
        cp.point = location;
    }
    if flags.normals {
        cp.normal = (points_b[b1] - points_b[b0]).perp().normalized();
    }
    if flags.metadata || flags.penetration_depth {
        cp.contour1_line_start = a0;
        cp.contour1_line_end = a1;
        cp.contour2_line_start = b0;
        cp.contour2_line_end = b1;
        // Entering when the first edge runs against the second edge's
        // perpendicular; consistent with ccw winding on both contours.
        let dir_a = points_a[a1] - points_a[a0];
        let perp_b = (points_b[b1] - points_b[b0]).perp();
        cp.is_entry = dir_a.dot(perp_b) < 0.0;
    }
    cp
}

/// Whole-containment heuristic for a contour pair.
fn containment(first: &Contour, second: &Contour) -> Option<Containment> {
    if contour_inside(first, second) {
        Some(Containment::FirstInsideSecond)
    } else if contour_inside(second, first) {
        Some(Containment::SecondInsideFirst)
    } else {
        None
    }
}

/// One representative vertex inside, plus the inner bounding circle
/// fully within the outer one.
///
/// Degenerate contours (fewer than three points) bound no area and are
/// never contained.
fn contour_inside(inner: &Contour, outer: &Contour) -> bool {
    if inner.len() < 3 {
        return false;
    }
    let Some(&vertex) = inner.points().first() else {
        return false;
    };
    if !outer.contains_point(vertex) {
        return false;
    }
    let center_gap = inner.centroid().distance(outer.centroid());
    center_gap + inner.bounding_radius() <= outer.bounding_radius()
}

/// Reconstruct penetration depth for every report with crossings.
///
/// Crossings come in entry/exit pairs; an odd count means numerically
/// coincident geometry confused the classification, in which case the
/// pair is skipped with a warning rather than miscomputed.
fn calculate_penetration_depth(
    reports: &mut [CollidingContours],
    contours_a: &[Contour],
    contours_b: &[Contour],
) {
    for report in reports {
        if report.points.is_empty() {
            continue;
        }
        if report.points.len() % 2 != 0 {
            log::warn!(
                "odd number of collision points ({}) between contours {} and {}; \
                 skipping penetration depth",
                report.points.len(),
                report.contour1,
                report.contour2,
            );
            continue;
        }

        let contour_a = &contours_a[report.contour1];
        let contour_b = &contours_b[report.contour2];
        let count = report.points.len();

        // One common normal for the whole overlap: sum of the
        // perpendiculars of every entry-to-exit chord.
        let mut normal = Point::ZERO;
        for pair_start in (0..count).step_by(2) {
            let (entry, exit) = ordered_pair(&report.points, pair_start);
            normal = normal + (entry.point - exit.point).perp();
        }
        let normal = normal.normalized();
        report.penetration_normal = normal;

        // Walk each overlap region and project its boundary points onto
        // the normal; the spread is that region's depth.
        report.penetration_depth = 0.0;
        for pair_start in (0..count).step_by(2) {
            let (entry, exit) = ordered_pair(&report.points, pair_start);

            let mut region_a = vec![exit.point - entry.point, Point::ZERO];
            let len_a = contour_a.points().len();
            let mut idx = entry.contour1_line_end;
            while idx != exit.contour1_line_end {
                region_a.push(contour_a.points()[idx] - entry.point);
                idx = (idx + 1) % len_a;
            }

            let mut region_b = vec![exit.point - entry.point, Point::ZERO];
            let len_b = contour_b.points().len();
            let mut idx = exit.contour2_line_end;
            while idx != entry.contour2_line_end {
                region_b.push(contour_b.points()[idx] - entry.point);
                idx = (idx + 1) % len_b;
            }

            let mut depth_a = f32::INFINITY;
            for &p in &region_a {
                let d = p.dot(normal);
                if d < depth_a {
                    depth_a = d;
                    report.contour1_deep_point = p + entry.point;
                }
            }
            let mut depth_b = f32::NEG_INFINITY;
            for &p in &region_b {
                let d = p.dot(normal);
                if d > depth_b {
                    depth_b = d;
                    report.contour2_deep_point = p + entry.point;
                }
            }
            report.penetration_depth = report.penetration_depth.max(depth_b - depth_a);
        }
    }
}

/// The entry point of a crossing pair, then its exit.
fn ordered_pair(points: &[CollisionPoint], pair_start: usize) -> (CollisionPoint, CollisionPoint) {
    let first = if points[pair_start].is_entry {
        pair_start
    } else {
        pair_start + 1
    };
    (
        points[first % points.len()],
        points[(first + 1) % points.len()],
    )
}
