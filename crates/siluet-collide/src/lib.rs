//! siluet-collide: Pure sprite outline collision engine (sans-IO).
//!
//! Turns a sprite's alpha channel into collidable geometry and tests
//! pairs of transformed outlines for intersection:
//! boundary tracing -> simplification -> bounding volumes ->
//! staged collision testing (bounding circle, optional OBB, optional
//! containment, sub-circle pruning, exact edge intersection).
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! rasters and `std::io` byte streams and returns structured data.
//! File handling, previews, and command-line plumbing live in the
//! sibling crates.

pub mod collide;
pub mod contour;
pub mod disc;
pub mod geometry;
pub mod obb;
pub mod outline;
pub mod simplify;
pub mod trace;
pub mod types;

mod codec;

pub use collide::{CollidingContours, CollisionInfoFlags, CollisionPoint, Containment};
pub use contour::{Contour, SubCircle};
pub use obb::Obb;
pub use outline::{Outline, Transform};
pub use trace::{BoundaryTracer, TraceMode};
pub use types::{Accuracy, Circle, OutlineError, Point, RgbaImage, TraceConfig};

/// Trace a sprite raster straight into a collision-ready outline.
///
/// Runs the full pipeline: boundary tracing with the configured
/// strategy, simplification to the configured accuracy, then bounding
/// volume preparation (outline disc plus chunked sub-circles). The
/// returned outline carries the identity transform and is ready for
/// [`Outline::collide`].
///
/// A blank or fully transparent raster produces an outline with no
/// contours, which is valid and simply never collides.
#[must_use]
pub fn trace_outline(image: &RgbaImage, config: &TraceConfig) -> Outline {
    let raw = trace::trace(image, config);
    let contours = simplify::simplify_contours(&raw, config.accuracy);
    let mut outline = Outline::new(contours);
    outline.prepare(config.chunk_size);
    outline
}
