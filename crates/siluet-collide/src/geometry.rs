//! Scalar geometric predicates shared by the tracer and the collision
//! tester.

use crate::types::Point;

/// A confirmed crossing between two line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Where the segments cross.
    pub point: Point,
    /// Parameter along the first segment, in `[0, 1]`.
    pub t_a: f32,
    /// Parameter along the second segment, in `[0, 1]`.
    pub t_b: f32,
}

/// Intersection of segments `a1-a2` and `b1-b2`.
///
/// Parametric form from the comp.graphics.algorithms FAQ. Parallel and
/// collinear segments yield `None` — collinear overlap is deliberately
/// unreported, a documented limitation of the engine.
///
/// The interval for `t_b` is half-open, with the open end chosen by the
/// second segment's y direction, so a ray crossing a shared polygon
/// vertex is counted once rather than once per incident edge.
#[must_use]
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<SegmentHit> {
    let dir_a = a2 - a1;
    let dir_b = b2 - b1;

    let denominator = dir_a.perp_dot(dir_b);
    if denominator == 0.0 {
        return None;
    }

    let offset = a1 - b1;
    let t_a = dir_b.perp_dot(offset) / denominator;
    let t_b = dir_a.perp_dot(offset) / denominator;

    if !(0.0..=1.0).contains(&t_a) {
        return None;
    }
    let b_in_range = if b1.y < b2.y {
        (0.0..1.0).contains(&t_b)
    } else {
        t_b > 0.0 && t_b <= 1.0
    };
    if !b_in_range {
        return None;
    }

    Some(SegmentHit {
        point: a1.lerp(a2, t_a),
        t_a,
        t_b,
    })
}

/// Ray-casting point-in-polygon test.
///
/// The polygon is implicitly closed (last point connects to the first)
/// and assumed simple. Points on the boundary may land on either side
/// depending on rounding; callers needing boundary inclusiveness should
/// test the boundary separately.
#[must_use]
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut prev = polygon[polygon.len() - 1];
    for &current in polygon {
        if (prev.y > point.y) != (current.y > point.y) {
            let t = (point.y - prev.y) / (current.y - prev.y);
            let crossing_x = t.mul_add(current.x - prev.x, prev.x);
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        prev = current;
    }
    inside
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
#[must_use]
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f32 {
    let span = b - a;
    let length_sq = span.length_squared();
    if length_sq == 0.0 {
        return p.distance(a);
    }
    span.perp_dot(p - a).abs() / length_sq.sqrt()
}

/// Convex hull via Andrew's monotone chain.
///
/// Returns the hull in the engine's contour winding (counter-clockwise
/// in image coordinates, y down). Duplicate and interior points are
/// removed; fewer than three distinct points come back as-is.
#[must_use]
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let turns_left = |o: Point, a: Point, b: Point| (a - o).perp_dot(b - o) <= 0.0;

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && turns_left(lower[lower.len() - 2], lower[lower.len() - 1], p) {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && turns_left(upper[upper.len() - 2], upper[upper.len() - 1], p) {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    // The chains above build the hull clockwise in image coordinates;
    // reverse to match the tracer's winding.
    lower.reverse();
    lower
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_intersect_at_midpoint() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        )
        .unwrap();
        assert!(hit.point.distance(Point::new(1.0, 1.0)) < 1e-6);
        assert!((hit.t_a - 0.5).abs() < 1e-6);
        assert!((hit.t_b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn separated_segments_do_not_intersect() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_segments_report_no_intersection() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(4.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn collinear_overlap_is_unreported() {
        // Documented limitation: overlapping collinear segments have no
        // single crossing point, so nothing is reported.
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(6.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn vertex_on_monotone_chain_counts_once() {
        // Each edge owns its lower-y endpoint, so a ray through a
        // vertex where the chain keeps descending crosses exactly once.
        let ray_from = Point::new(-10.0, 1.0);
        let ray_to = Point::new(10.0, 1.0);
        let vertex = Point::new(0.0, 1.0);
        let above = Point::new(-1.0, 0.0);
        let below = Point::new(1.0, 2.0);

        let first = segment_intersection(ray_from, ray_to, above, vertex);
        let second = segment_intersection(ray_from, ray_to, vertex, below);
        assert_eq!(
            usize::from(first.is_some()) + usize::from(second.is_some()),
            1,
            "chain vertex must be counted exactly once",
        );
    }

    #[test]
    fn vertex_at_local_extremum_preserves_parity() {
        // A ray grazing a V-shaped vertex is counted twice (both edges
        // own the shared lower endpoint), leaving crossing parity even.
        let ray_from = Point::new(-10.0, 1.0);
        let ray_to = Point::new(10.0, 1.0);
        let apex = Point::new(0.0, 1.0);
        let left = Point::new(-1.0, 3.0);
        let right = Point::new(1.0, 3.0);

        let first = segment_intersection(ray_from, ray_to, left, apex);
        let second = segment_intersection(ray_from, ray_to, apex, right);
        assert_eq!(
            usize::from(first.is_some()) + usize::from(second.is_some()),
            2,
            "tangent vertex must be counted twice",
        );
    }

    #[test]
    fn point_in_unit_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ];
        assert!(point_in_polygon(Point::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Point::new(1.5, 0.5), &square));
        assert!(!point_in_polygon(Point::new(0.5, -0.5), &square));
    }

    #[test]
    fn point_in_concave_polygon_notch() {
        // A "U" shape: the notch between the prongs is outside.
        let shape = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(3.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(1.0, 2.0),
            Point::new(1.0, 0.0),
        ];
        assert!(!point_in_polygon(Point::new(1.5, 1.0), &shape));
        assert!(point_in_polygon(Point::new(0.5, 1.0), &shape));
        assert!(point_in_polygon(Point::new(1.5, 2.5), &shape));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(Point::ZERO, &[]));
        assert!(!point_in_polygon(
            Point::ZERO,
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
        ));
    }

    #[test]
    fn perpendicular_distance_on_axis() {
        let d = perpendicular_distance(
            Point::new(1.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-6);
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints() {
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn hull_of_square_with_interior_point() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point::new(2.0, 2.0)));
    }

    #[test]
    fn hull_winding_matches_contours() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let hull = convex_hull(&points);
        // Counter-clockwise in image coordinates: negative shoelace sum.
        let mut doubled_area = 0.0;
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            doubled_area += a.perp_dot(b);
        }
        assert!(doubled_area < 0.0, "hull should wind ccw in image coords");
    }

    #[test]
    fn hull_of_collinear_points_is_the_segment() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 2);
    }
}
