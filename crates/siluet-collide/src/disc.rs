//! Minimum enclosing disc computation.
//!
//! Incremental constrained-disc algorithm: start with the disc spanned
//! by the first two points, then for every point not already enclosed,
//! rebuild the smallest disc that passes through it (and, in the nested
//! stages, through one or two earlier boundary points; three boundary
//! points pin the circumcircle). Worst case quadratic, which is plenty
//! for sprite outline point counts; Welzl's expected-linear variant
//! could replace this behind the same contract.

use crate::types::{Circle, Point};

/// Slack added to containment checks so accumulated `f32` rounding
/// never ejects a boundary point.
const DISC_EPSILON: f32 = 1e-4;

/// The smallest circle containing all given points.
///
/// Every input point ends up within `radius + epsilon` of the center,
/// and no smaller circle encloses the whole set. An empty input yields
/// a zero-radius circle at the origin — a defined edge case, not an
/// error.
#[must_use]
pub fn minimum_enclosing_disc(points: &[Point]) -> Circle {
    match points {
        [] => Circle::default(),
        [p] => Circle::new(*p, 0.0),
        [a, b] => circle_from_two(*a, *b),
        _ => {
            let mut disc = circle_from_two(points[0], points[1]);
            for i in 2..points.len() {
                if !contains(&disc, points[i]) {
                    disc = disc_with_point(&points[..i], points[i]);
                }
            }
            disc
        }
    }
}

/// Smallest disc over `points` with `q` on its boundary.
fn disc_with_point(points: &[Point], q: Point) -> Circle {
    let mut disc = circle_from_two(points[0], q);
    for j in 1..points.len() {
        if !contains(&disc, points[j]) {
            disc = disc_with_two_points(&points[..j], points[j], q);
        }
    }
    disc
}

/// Smallest disc over `points` with `q1` and `q2` on its boundary.
fn disc_with_two_points(points: &[Point], q1: Point, q2: Point) -> Circle {
    let mut disc = circle_from_two(q1, q2);
    for &p in points {
        if !contains(&disc, p) {
            disc = circumcircle(p, q1, q2);
        }
    }
    disc
}

/// The disc with the segment `ab` as diameter.
#[must_use]
pub fn circle_from_two(a: Point, b: Point) -> Circle {
    let center = a.lerp(b, 0.5);
    Circle::new(center, center.distance(a))
}

/// The circle through three points.
///
/// Near-collinear triples have no finite circumcenter; fall back to the
/// diameter disc of the farthest-apart pair, which encloses the third.
fn circumcircle(a: Point, b: Point, c: Point) -> Circle {
    let d = 2.0 * (b - a).perp_dot(c - a);
    if d.abs() <= f32::EPSILON {
        let ab = a.distance_squared(b);
        let ac = a.distance_squared(c);
        let bc = b.distance_squared(c);
        return if ab >= ac && ab >= bc {
            circle_from_two(a, b)
        } else if ac >= bc {
            circle_from_two(a, c)
        } else {
            circle_from_two(b, c)
        };
    }

    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point::new(ux, uy);
    Circle::new(center, center.distance(a))
}

fn contains(disc: &Circle, p: Point) -> bool {
    let reach = disc.radius + DISC_EPSILON;
    disc.center.distance_squared(p) <= reach * reach
}
