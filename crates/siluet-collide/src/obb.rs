//! Minimal-area oriented bounding boxes.
//!
//! Optional collision pre-test: tighter than the bounding circle for
//! elongated shapes, still far cheaper than edge-exact testing. The box
//! is found by rotating calipers over the convex hull (the minimal-area
//! rectangle shares a side direction with some hull edge), and two
//! boxes are compared with a separating-axis test over their four
//! unique axis directions.

use crate::geometry::convex_hull;
use crate::types::Point;

/// A rotated rectangle, stored as its four corners in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Corner positions, consecutive corners sharing an edge.
    pub corners: [Point; 4],
}

impl Obb {
    /// The minimal-area oriented rectangle enclosing `points`.
    ///
    /// Returns `None` for an empty input. Degenerate inputs (a single
    /// point, collinear points) produce a zero-width rectangle.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let hull = convex_hull(points);
        match hull.as_slice() {
            [] => None,
            [p] => Some(Self { corners: [*p; 4] }),
            hull => Some(best_rectangle(hull)),
        }
    }

    /// Rectangle area.
    #[must_use]
    pub fn area(&self) -> f32 {
        let w = self.corners[0].distance(self.corners[1]);
        let h = self.corners[1].distance(self.corners[2]);
        w * h
    }

    /// Separating-axis overlap test against another rectangle.
    ///
    /// Touching boxes count as overlapping. With only two rectangles
    /// there are four unique candidate axes (two per box).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        for axis in self.axes().into_iter().chain(other.axes()) {
            let (min_a, max_a) = project(&self.corners, axis);
            let (min_b, max_b) = project(&other.corners, axis);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
        true
    }

    /// The two edge directions of this rectangle.
    ///
    /// Zero for degenerate (point-like) boxes, which makes the axis a
    /// no-op in the separating-axis loop.
    fn axes(&self) -> [Point; 2] {
        [
            (self.corners[1] - self.corners[0]).normalized(),
            (self.corners[2] - self.corners[1]).normalized(),
        ]
    }
}

/// Projection interval of a corner set onto an axis.
fn project(corners: &[Point; 4], axis: Point) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &c in corners {
        let d = c.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Rotating calipers: try each hull edge direction as a side direction
/// and keep the smallest-area rectangle.
fn best_rectangle(hull: &[Point]) -> Obb {
    let mut best: Option<(f32, Obb)> = None;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let axis = (b - a).normalized();
        if axis == Point::ZERO {
            continue;
        }
        let normal = axis.perp();

        let mut min_u = f32::INFINITY;
        let mut max_u = f32::NEG_INFINITY;
        let mut min_v = f32::INFINITY;
        let mut max_v = f32::NEG_INFINITY;
        for &p in hull {
            let u = p.dot(axis);
            let v = p.dot(normal);
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_none_or(|(best_area, _)| area < *best_area) {
            let corner = |u: f32, v: f32| axis * u + normal * v;
            let rect = Obb {
                corners: [
                    corner(min_u, min_v),
                    corner(max_u, min_v),
                    corner(max_u, max_v),
                    corner(min_u, max_v),
                ],
            };
            best = Some((area, rect));
        }
    }

    // A multi-point hull always has at least one non-degenerate edge.
    best.map_or(
        Obb {
            corners: [hull[0]; 4],
        },
        |(_, rect)| rect,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_box() {
        assert!(Obb::from_points(&[]).is_none());
    }

    #[test]
    fn axis_aligned_square_is_recovered() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let obb = Obb::from_points(&square).unwrap();
        assert!((obb.area() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn tilted_rectangle_beats_axis_aligned_bounds() {
        // A thin 45-degree bar: the minimal box hugs the bar while the
        // axis-aligned bounds would be a fat square.
        let bar = [
            Point::new(0.0, 0.0),
            Point::new(0.5, -0.5),
            Point::new(5.5, 4.5),
            Point::new(5.0, 5.0),
        ];
        let obb = Obb::from_points(&bar).unwrap();
        let aabb_area = 5.5 * 5.5;
        assert!(
            obb.area() < aabb_area / 2.0,
            "expected tight tilted box, got area {}",
            obb.area(),
        );
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = Obb::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        let b = Obb::from_points(&[
            Point::new(3.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(3.0, 1.0),
        ])
        .unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn rotated_boxes_separated_only_by_diagonal_axis() {
        // Two unit squares, one rotated 45 degrees and nestled into the
        // corner gap: axis-aligned intervals overlap but the diagonal
        // axis separates them.
        let axis_aligned = Obb::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        let diamond = Obb::from_points(&[
            Point::new(0.9, 1.6),
            Point::new(1.6, 0.9),
            Point::new(2.3, 1.6),
            Point::new(1.6, 2.3),
        ])
        .unwrap();
        assert!(!axis_aligned.overlaps(&diamond));
        assert!(!diamond.overlaps(&axis_aligned));
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Obb::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        let b = Obb::from_points(&[
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap();
        assert!(a.overlaps(&b));
    }

    #[test]
    fn collinear_points_make_a_zero_width_box() {
        let line = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(4.0, 4.0),
        ];
        let obb = Obb::from_points(&line).unwrap();
        assert!(obb.area() < 1e-4);
    }
}
