//! Collidable outlines: owned contours plus a rigid 2D transform.
//!
//! The transform is a value (scale, then rotate, then translate);
//! world-space geometry is computed lazily and cached until the next
//! transform change. An `Outline` is exclusively owned data — cloning
//! is deep, and concurrent use of one outline from several threads must
//! be serialized by the caller (the cache is not synchronized).

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::collide::CollisionInfoFlags;
use crate::contour::{Contour, RADIUS_PADDING};
use crate::disc::minimum_enclosing_disc;
use crate::geometry::convex_hull;
use crate::obb::Obb;
use crate::types::{Circle, OutlineError, Point};

/// A rigid 2D transform: scale, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position of the outline's local origin.
    pub translation: Point,
    /// Rotation in radians around the local origin.
    pub rotation: f32,
    /// Per-axis scale factors applied before rotation.
    pub scale: Point,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Point::ZERO,
        rotation: 0.0,
        scale: Point::new(1.0, 1.0),
    };

    /// Map a local-space point into world space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        p.scaled(self.scale.x, self.scale.y).rotated(self.rotation) + self.translation
    }

    /// Factor by which cached radii must inflate to stay conservative:
    /// the largest absolute axis scale.
    #[must_use]
    pub fn radius_scale(&self) -> f32 {
        self.scale.x.abs().max(self.scale.y.abs())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World-space geometry derived from the contours and the transform.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorldGeometry {
    pub contours: Vec<Contour>,
    pub bounding: Circle,
}

/// One collidable shape: contours, transform, bounding volumes, and
/// per-instance collision test settings.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    contours: Vec<Contour>,
    transform: Transform,
    local_bounding: Option<Circle>,
    world: OnceCell<WorldGeometry>,
    world_obb: OnceCell<Option<Obb>>,
    inside_test: bool,
    obb_test: bool,
    info: CollisionInfoFlags,
}

impl Outline {
    /// Assemble an outline from contours.
    ///
    /// The result is unprepared: call [`prepare`](Self::prepare) (or
    /// the individual `calculate_*` methods) before collision or point
    /// queries, which otherwise fail with
    /// [`OutlineError::InvalidState`].
    #[must_use]
    pub fn new(contours: Vec<Contour>) -> Self {
        Self {
            contours,
            ..Self::default()
        }
    }

    /// The outline's contours, in local space.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Current translation.
    #[must_use]
    pub const fn translation(&self) -> Point {
        self.transform.translation
    }

    /// Current rotation in radians.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    /// Current per-axis scale.
    #[must_use]
    pub const fn scale(&self) -> Point {
        self.transform.scale
    }

    /// Move the outline's origin to `(x, y)` in world space.
    pub fn set_translation(&mut self, x: f32, y: f32) {
        self.transform.translation = Point::new(x, y);
        self.invalidate();
    }

    /// Set the rotation angle in radians.
    pub fn set_rotation(&mut self, radians: f32) {
        self.transform.rotation = radians;
        self.invalidate();
    }

    /// Rotate by `radians` relative to the current angle.
    pub fn rotate(&mut self, radians: f32) {
        self.transform.rotation += radians;
        self.invalidate();
    }

    /// Set per-axis scale factors. Zero components are ignored — a
    /// flattened outline has no meaningful boundary.
    pub fn set_scale(&mut self, x: f32, y: f32) {
        if x == 0.0 || y == 0.0 {
            return;
        }
        self.transform.scale = Point::new(x, y);
        self.invalidate();
    }

    /// Whether the whole-containment pre-test runs for this outline.
    #[must_use]
    pub const fn inside_test(&self) -> bool {
        self.inside_test
    }

    /// Enable the whole-containment pre-test (see
    /// [`collide`](Self::collide)).
    pub fn set_inside_test(&mut self, enabled: bool) {
        self.inside_test = enabled;
    }

    /// Whether the oriented-bounding-box pre-test runs for this
    /// outline.
    #[must_use]
    pub const fn obb_test(&self) -> bool {
        self.obb_test
    }

    /// Enable the oriented-bounding-box pre-test.
    pub fn set_obb_test(&mut self, enabled: bool) {
        self.obb_test = enabled;
    }

    /// How much contact detail [`collide_detailed`](Self::collide_detailed)
    /// records.
    #[must_use]
    pub const fn collision_info(&self) -> CollisionInfoFlags {
        self.info
    }

    /// Choose how much contact detail to collect. All flags default to
    /// off, which keeps plain [`collide`](Self::collide) on its
    /// first-hit fast path.
    pub fn enable_collision_info(&mut self, flags: CollisionInfoFlags) {
        self.info = flags;
    }

    /// Recompute every contour's centroid/radius and the outline's
    /// minimum enclosing disc (in local space).
    pub fn calculate_radius(&mut self) {
        for contour in &mut self.contours {
            contour.calculate_bounding();
        }
        let all_points: Vec<Point> = self
            .contours
            .iter()
            .flat_map(|c| c.points().iter().copied())
            .collect();
        let mut disc = minimum_enclosing_disc(&all_points);
        disc.radius += RADIUS_PADDING;
        self.local_bounding = Some(disc);
        self.invalidate();
    }

    /// Recompute every contour's sub-circle partition with the given
    /// chunk size (points per sub-circle).
    pub fn calculate_sub_circles(&mut self, chunk_size: usize) {
        for contour in &mut self.contours {
            contour.calculate_sub_circles(chunk_size);
        }
        self.invalidate();
    }

    /// Give every contour a single enclosing sub-circle instead of a
    /// chunked partition — cheaper to maintain for small contours.
    pub fn calculate_smallest_enclosing_discs(&mut self) {
        for contour in &mut self.contours {
            contour.calculate_smallest_enclosing_disc();
        }
        self.invalidate();
    }

    /// Replace every contour by its convex hull and bound each with its
    /// smallest enclosing disc (which suits convex shapes well).
    pub fn calculate_convex_hulls(&mut self) {
        for contour in &mut self.contours {
            let hull = convex_hull(contour.points());
            contour.replace_points(hull);
        }
        self.calculate_radius();
        self.calculate_smallest_enclosing_discs();
    }

    /// Compute all bounding volumes: per-contour bounding data, the
    /// outline disc, and chunked sub-circles.
    pub fn prepare(&mut self, chunk_size: usize) {
        self.calculate_radius();
        self.calculate_sub_circles(chunk_size);
    }

    /// Returns `true` if collision queries are ready to run.
    ///
    /// An outline with no contours is trivially prepared (and never
    /// collides).
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.contours.is_empty()
            || (self.local_bounding.is_some()
                && self
                    .contours
                    .iter()
                    .all(|c| c.is_empty() || !c.sub_circles().is_empty()))
    }

    pub(crate) fn ensure_prepared(&self) -> Result<(), OutlineError> {
        if self.contours.is_empty() {
            return Ok(());
        }
        if self.local_bounding.is_none() {
            return Err(OutlineError::InvalidState(
                "bounding circle missing; call prepare() or calculate_radius()",
            ));
        }
        if self
            .contours
            .iter()
            .any(|c| !c.is_empty() && c.sub_circles().is_empty())
        {
            return Err(OutlineError::InvalidState(
                "sub-circles missing; call prepare() or calculate_sub_circles()",
            ));
        }
        Ok(())
    }

    /// The world-space minimum enclosing disc.
    ///
    /// # Errors
    ///
    /// [`OutlineError::InvalidState`] if the outline was never
    /// prepared.
    pub fn bounding_circle(&self) -> Result<Circle, OutlineError> {
        self.ensure_prepared()?;
        Ok(self.world().bounding)
    }

    /// Test whether a world-space point lies inside the outline.
    ///
    /// A point must be inside some solid contour and outside every hole
    /// contour, so points within a traced hole report `false`.
    ///
    /// # Errors
    ///
    /// [`OutlineError::InvalidState`] if the outline was never
    /// prepared.
    pub fn point_inside(&self, point: Point) -> Result<bool, OutlineError> {
        self.ensure_prepared()?;
        let world = self.world();
        if !world.bounding.contains(point) {
            return Ok(false);
        }
        if !world.contours.iter().any(|c| c.contains_point(point)) {
            return Ok(false);
        }
        Ok(!world
            .contours
            .iter()
            .any(|c| c.is_hole() && c.winding_contains(point)))
    }

    /// World-space geometry, recomputed on first use after a transform
    /// change.
    pub(crate) fn world(&self) -> &WorldGeometry {
        self.world.get_or_init(|| {
            let transform = self.transform;
            let radius_scale = transform.radius_scale();
            let contours = self
                .contours
                .iter()
                .map(|c| c.mapped(|p| transform.apply(p), radius_scale))
                .collect();
            let local = self.local_bounding.unwrap_or_default();
            let bounding = Circle::new(transform.apply(local.center), local.radius * radius_scale);
            WorldGeometry { contours, bounding }
        })
    }

    /// World-space minimal-area oriented bounding box, computed on
    /// demand; `None` when the outline has no points.
    pub(crate) fn world_obb(&self) -> Option<&Obb> {
        self.world_obb
            .get_or_init(|| {
                let points: Vec<Point> = self
                    .world()
                    .contours
                    .iter()
                    .flat_map(|c| c.points().iter().copied())
                    .collect();
                Obb::from_points(&points)
            })
            .as_ref()
    }

    /// Recompute only the outline-level disc, keeping per-contour
    /// bounding data as is. Used when restoring persisted geometry,
    /// where the contour caches come from the stream.
    pub(crate) fn restore_outline_disc(&mut self) {
        let all_points: Vec<Point> = self
            .contours
            .iter()
            .flat_map(|c| c.points().iter().copied())
            .collect();
        let mut disc = minimum_enclosing_disc(&all_points);
        disc.radius += RADIUS_PADDING;
        self.local_bounding = Some(disc);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.world = OnceCell::new();
        self.world_obb = OnceCell::new();
    }
}
