//! Closed collision contours and their sub-circle acceleration data.
//!
//! A contour is an ordered, implicitly closed polygon (the closing
//! duplicate point is never stored), wound counter-clockwise in image
//! coordinates. Its points are partitioned into contiguous chunks, each
//! bounded by a small circle; the collision tester only runs exact edge
//! tests inside pairs of overlapping chunks.

use serde::{Deserialize, Serialize};

use crate::disc::minimum_enclosing_disc;
use crate::geometry::point_in_polygon;
use crate::types::{Circle, Point};

/// Padding added to every cached radius so `f32` rounding never drops a
/// boundary point outside its circle.
pub(crate) const RADIUS_PADDING: f32 = 0.01;

/// A bounding circle over a contiguous, wrap-aware run of contour
/// edges.
///
/// Covers edges `start..end` (end exclusive); `end == len` covers the
/// closing edge back to point 0. Every point an edge in the range
/// touches lies within the circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubCircle {
    /// The bounding circle.
    pub circle: Circle,
    /// First edge index covered.
    pub start: usize,
    /// One past the last edge index covered; at most the point count.
    pub end: usize,
}

/// One closed polygon boundary of a collidable shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
    sub_circles: Vec<SubCircle>,
    centroid: Point,
    bounding_radius: f32,
    is_hole: bool,
}

impl Contour {
    /// Create a contour from its boundary points.
    ///
    /// Points must be in order, counter-clockwise in image coordinates,
    /// without a closing duplicate. Bounding data starts out empty; an
    /// outline assembled manually must run its `calculate_*` methods
    /// before collision queries.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        points: Vec<Point>,
        sub_circles: Vec<SubCircle>,
        centroid: Point,
        bounding_radius: f32,
        is_hole: bool,
    ) -> Self {
        Self {
            points,
            sub_circles,
            centroid,
            bounding_radius,
            is_hole,
        }
    }

    /// The boundary points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The sub-circle partition; empty until computed.
    #[must_use]
    pub fn sub_circles(&self) -> &[SubCircle] {
        &self.sub_circles
    }

    /// Mean of the boundary points.
    ///
    /// Not the true centroid of area — boundary-dense regions pull it.
    /// It only seeds the containment heuristic and the saved file, so
    /// the looseness is acceptable.
    #[must_use]
    pub const fn centroid(&self) -> Point {
        self.centroid
    }

    /// Radius around [`centroid`](Self::centroid) reaching every point.
    #[must_use]
    pub const fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Whether this contour bounds a hole (an enclosed transparent
    /// region). Hole contours never satisfy containment queries.
    #[must_use]
    pub const fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Mark this contour as a hole boundary.
    pub fn set_hole(&mut self, is_hole: bool) {
        self.is_hole = is_hole;
    }

    /// Number of boundary points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace the boundary points, dropping stale bounding data.
    pub(crate) fn replace_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.sub_circles.clear();
        self.centroid = Point::ZERO;
        self.bounding_radius = 0.0;
    }

    /// Recompute the centroid and the bounding radius around it.
    pub fn calculate_bounding(&mut self) {
        if self.points.is_empty() {
            self.centroid = Point::ZERO;
            self.bounding_radius = 0.0;
            return;
        }

        let mut sum = Point::ZERO;
        for &p in &self.points {
            sum = sum + p;
        }
        #[allow(clippy::cast_precision_loss)]
        let centroid = sum * (1.0 / self.points.len() as f32);

        let mut radius: f32 = 0.0;
        for &p in &self.points {
            radius = radius.max(centroid.distance(p));
        }

        self.centroid = centroid;
        self.bounding_radius = radius + RADIUS_PADDING;
    }

    /// Partition the points into fixed-size chunks and bound each with
    /// its minimum enclosing disc.
    ///
    /// Chunks are contiguous, start at edge 0, and end at the point
    /// count, so together they cover every edge exactly once. Each disc
    /// also encloses the point shared with the following chunk (and,
    /// for the last chunk, point 0, which closes the polygon).
    pub fn calculate_sub_circles(&mut self, chunk_size: usize) {
        self.sub_circles.clear();
        let len = self.points.len();
        if len == 0 {
            return;
        }

        let chunk = chunk_size.max(2);
        let mut start = 0;
        let mut scratch: Vec<Point> = Vec::with_capacity(chunk + 1);
        while start < len {
            let end = (start + chunk).min(len);
            scratch.clear();
            for i in start..=end {
                scratch.push(self.points[i % len]);
            }
            let mut circle = minimum_enclosing_disc(&scratch);
            circle.radius += RADIUS_PADDING;
            self.sub_circles.push(SubCircle { circle, start, end });
            start = end;
        }
    }

    /// Bound the whole contour with a single sub-circle.
    ///
    /// Skips the chunking overhead; appropriate for small contours.
    pub fn calculate_smallest_enclosing_disc(&mut self) {
        self.sub_circles.clear();
        let len = self.points.len();
        if len == 0 {
            return;
        }
        let mut circle = minimum_enclosing_disc(&self.points);
        circle.radius += RADIUS_PADDING;
        self.sub_circles.push(SubCircle {
            circle,
            start: 0,
            end: len,
        });
    }

    /// Ray-cast containment test.
    ///
    /// Hole contours contain nothing; use
    /// [`winding_contains`](Self::winding_contains) to test the region
    /// a hole encloses.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        !self.is_hole && self.winding_contains(point)
    }

    /// Ray-cast test ignoring the hole flag.
    ///
    /// When sub-circles are available, whole chunks whose circle misses
    /// the ray's scanline are skipped, as in the classic
    /// implementation; otherwise every edge is tested.
    pub(crate) fn winding_contains(&self, point: Point) -> bool {
        let len = self.points.len();
        if len < 3 {
            return false;
        }
        if self.sub_circles.is_empty() {
            return point_in_polygon(point, &self.points);
        }

        let mut crossings = 0u32;
        for sc in &self.sub_circles {
            if (sc.circle.center.y - point.y).abs() > sc.circle.radius {
                continue;
            }
            for i in sc.start..sc.end {
                let a = self.points[i % len];
                let b = self.points[(i + 1) % len];
                if (a.y > point.y) != (b.y > point.y) {
                    let t = (point.y - a.y) / (b.y - a.y);
                    let crossing_x = t.mul_add(b.x - a.x, a.x);
                    if point.x < crossing_x {
                        crossings += 1;
                    }
                }
            }
        }
        crossings % 2 == 1
    }

    /// Map the contour into another coordinate space.
    ///
    /// `map` transforms positions; `radius_scale` inflates every cached
    /// radius (the largest axis scale factor, so circles stay
    /// conservative under non-uniform scaling). Chunk ranges and the
    /// hole flag carry over unchanged.
    pub(crate) fn mapped(&self, map: impl Fn(Point) -> Point, radius_scale: f32) -> Self {
        Self {
            points: self.points.iter().map(|&p| map(p)).collect(),
            sub_circles: self
                .sub_circles
                .iter()
                .map(|sc| SubCircle {
                    circle: Circle::new(map(sc.circle.center), sc.circle.radius * radius_scale),
                    start: sc.start,
                    end: sc.end,
                })
                .collect(),
            centroid: map(self.centroid),
            bounding_radius: self.bounding_radius * radius_scale,
            is_hole: self.is_hole,
        }
    }
}
