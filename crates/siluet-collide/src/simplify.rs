//! Contour simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Raw traced contours carry one point per boundary corner step; most
//! of them are collinear and only cost collision time. Points within
//! the accuracy level's perpendicular-distance tolerance of the line
//! between their surviving neighbors are removed, so the simplified
//! polygon never deviates from the raw boundary by more than the
//! tolerance.
//!
//! The ring variant anchors at point 0 and the point farthest from it,
//! then simplifies both halves; a closed polygon has no natural
//! endpoints to pin otherwise.

use crate::contour::Contour;
use crate::geometry::perpendicular_distance;
use crate::types::{Accuracy, Point};

/// Simplify a single contour to the given accuracy.
///
/// [`Accuracy::Raw`] returns the contour unchanged. Cached bounding
/// data is not carried over; simplification runs before an outline is
/// prepared. The hole flag survives.
#[must_use = "returns the simplified contour"]
pub fn simplify_contour(contour: &Contour, accuracy: Accuracy) -> Contour {
    let Some(tolerance) = accuracy.tolerance() else {
        return contour.clone();
    };

    let mut simplified = Contour::new(simplify_ring(contour.points(), tolerance));
    simplified.set_hole(contour.is_hole());
    simplified
}

/// Simplify a batch of traced contours, dropping any that collapse
/// below three points (they cannot bound area).
#[must_use = "returns the simplified contours"]
pub fn simplify_contours(contours: &[Contour], accuracy: Accuracy) -> Vec<Contour> {
    contours
        .iter()
        .map(|c| simplify_contour(c, accuracy))
        .filter(|c| c.len() >= 3)
        .collect()
}

/// Closed-ring Ramer-Douglas-Peucker.
///
/// Rings with fewer than four points have nothing removable.
fn simplify_ring(points: &[Point], tolerance: f32) -> Vec<Point> {
    if points.len() < 4 {
        return points.to_vec();
    }

    // Second anchor: the point farthest from point 0. Both anchors are
    // extreme points of the ring, so neither can be simplified away.
    let mut far_index = 1;
    let mut far_dist = 0.0;
    for (i, &p) in points.iter().enumerate().skip(1) {
        let d = points[0].distance_squared(p);
        if d > far_dist {
            far_dist = d;
            far_index = i;
        }
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[far_index] = true;

    rdp_recurse(points, 0, far_index, tolerance, &mut kept);
    // Second half wraps: index `len` aliases point 0.
    rdp_recurse(points, far_index, points.len(), tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step: find the point between `start` and `end` farthest
/// from their chord; keep it and recurse if it exceeds the tolerance.
///
/// `end` may equal `points.len()`, aliasing point 0 for the wrap chord.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f32, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let chord_a = points[start];
    let chord_b = points[end % points.len()];

    let mut max_dist = 0.0;
    let mut max_idx = start;
    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], chord_a, chord_b);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}
