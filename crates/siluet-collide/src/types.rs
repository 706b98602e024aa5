//! Shared types for the siluet collision engine.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::trace::TraceMode;

/// Re-export `RgbaImage` so downstream crates can hand sprite rasters
/// to the tracer without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point (or vector) in sprite coordinates.
///
/// `f32` end to end: the original outline data is pixel-derived and the
/// persistence format stores `f32`, which keeps save/load bit-exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f32,
    /// Vertical position (pixels from top edge, y grows downward).
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared length of this point treated as a vector.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x.mul_add(self.x, self.y * self.y)
    }

    /// Length of this point treated as a vector.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn perp_dot(self, other: Self) -> f32 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// The perpendicular vector `(-y, x)`.
    #[must_use]
    pub const fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Unit vector in the same direction, or zero for a (near-)zero
    /// vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Rotate around the origin by `angle` radians.
    ///
    /// Positive angles rotate from +x toward +y, which is clockwise on
    /// screen since y grows downward.
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x.mul_add(cos, -(self.y * sin)),
            self.x.mul_add(sin, self.y * cos),
        )
    }

    /// Component-wise scale.
    #[must_use]
    pub const fn scaled(self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    /// Linear interpolation from `self` to `other` at parameter `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            t.mul_add(other.x - self.x, self.x),
            t.mul_add(other.y - self.y, self.y),
        )
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// A circle in sprite coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center position.
    pub center: Point,
    /// Radius; never negative.
    pub radius: f32,
}

impl Circle {
    /// Create a new circle.
    #[must_use]
    pub const fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if the two circles touch or overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Returns `true` if the point is inside or on the circle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

/// How aggressively traced contours are simplified.
///
/// Maps to a perpendicular-distance tolerance in pixels for the
/// Ramer-Douglas-Peucker pass; [`Raw`](Self::Raw) skips simplification
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Accuracy {
    /// Keep every traced boundary point.
    Raw,
    /// 0.5 px tolerance; preserves pixel staircases on diagonals.
    High,
    /// 1.0 px tolerance; good default for most sprites.
    #[default]
    Medium,
    /// 2.0 px tolerance.
    Low,
    /// 4.0 px tolerance; coarse outlines for very large sprites.
    Poor,
}

impl Accuracy {
    /// The perpendicular-distance tolerance in pixels, or `None` for
    /// [`Raw`](Self::Raw).
    #[must_use]
    pub const fn tolerance(self) -> Option<f32> {
        match self {
            Self::Raw => None,
            Self::High => Some(0.5),
            Self::Medium => Some(1.0),
            Self::Low => Some(2.0),
            Self::Poor => Some(4.0),
        }
    }
}

/// Configuration for tracing a sprite raster into collision contours.
///
/// All parameters have sensible defaults; `TraceConfig::default()`
/// traces opaque regions of a typical sprite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Alpha threshold in `[0, 1]`. A pixel whose alpha (normalized to
    /// `[0, 1]`) is at least this value counts as solid.
    pub trans_limit: f32,

    /// Simplification level applied to raw traced contours.
    pub accuracy: Accuracy,

    /// Boundary tracing strategy.
    pub mode: TraceMode,

    /// Where the free-mode scan for contour starts begins.
    /// `None` means the top-left corner.
    pub start: Option<(u32, u32)>,

    /// Also trace the boundaries of fully enclosed transparent regions
    /// (holes). Hole contours are flagged and never satisfy
    /// point-containment queries.
    pub include_holes: bool,

    /// Target number of points per collision sub-circle.
    pub chunk_size: usize,
}

impl TraceConfig {
    /// Default alpha threshold.
    pub const DEFAULT_TRANS_LIMIT: f32 = 0.5;
    /// Default sub-circle chunk size in points.
    pub const DEFAULT_CHUNK_SIZE: usize = 12;
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trans_limit: Self::DEFAULT_TRANS_LIMIT,
            accuracy: Accuracy::default(),
            mode: TraceMode::default(),
            start: None,
            include_holes: false,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Errors surfaced by collision queries and outline persistence.
///
/// Degenerate geometry (parallel segments, empty point sets, blank
/// rasters) is never an error; only structural misuse is.
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    /// A collision or point query was invoked on an outline whose
    /// bounding volumes were never computed. Call
    /// [`Outline::prepare`](crate::Outline::prepare) (or the individual
    /// `calculate_*` methods) after assembling contours manually.
    #[error("outline not prepared for collision queries: {0}")]
    InvalidState(&'static str),

    /// The persisted outline stream is not in the expected format.
    #[error("invalid outline data: {0}")]
    Format(String),

    /// The persisted outline stream has a newer (or unknown) version.
    #[error("unsupported outline format version {0}")]
    UnsupportedVersion(u32),

    /// An underlying read or write failed.
    #[error("outline i/o failed")]
    Io(#[from] std::io::Error),
}
