//! Boundary tracing: extract closed contours from a sprite's alpha
//! channel.
//!
//! This module defines the [`BoundaryTracer`] trait for pluggable
//! tracing strategies and the [`TraceMode`] enum for selecting one at
//! runtime.
//!
//! # Corner grid
//!
//! Free-mode tracing works on the `(w+1)×(h+1)` grid of corners between
//! pixels. Each corner stores a 4-bit mask of which touching pixels are
//! solid:
//!
//! ```text
//! 0x1: upper left    0x2: upper right
//! 0x4: lower left    0x8: lower right
//! ```
//!
//! A boundary walk moves corner to corner keeping solid pixels on the
//! inside, which yields counter-clockwise winding (in image
//! coordinates) for outer boundaries without any post-processing.

use std::collections::HashSet;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::types::{Point, TraceConfig};

/// Selects which boundary tracing strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraceMode {
    /// Corner-grid boundary following from a scan start position.
    ///
    /// Handles arbitrary blob shapes, multiple disjoint shapes, and
    /// (optionally) hole boundaries.
    #[default]
    Free,

    /// Column-run rectangles.
    ///
    /// Each maximal vertical run of solid pixels becomes a rectangle;
    /// identical runs in adjacent columns merge. Suited to mostly
    /// rectangular sprite sheets with vertical separators.
    Columns,
}

/// Trait for boundary tracing strategies.
///
/// Input: an RGBA raster plus trace parameters. Output: zero or more
/// raw (unsimplified) closed contours. A blank raster is not an error —
/// an outline with no contours simply never collides.
pub trait BoundaryTracer {
    /// Trace the solid regions of `image` into contours.
    fn trace(&self, image: &RgbaImage, config: &TraceConfig) -> Vec<Contour>;
}

impl BoundaryTracer for TraceMode {
    fn trace(&self, image: &RgbaImage, config: &TraceConfig) -> Vec<Contour> {
        match *self {
            Self::Free => trace_free(image, config),
            Self::Columns => trace_columns(image, config),
        }
    }
}

/// Trace `image` with the strategy selected in `config`.
#[must_use]
pub fn trace(image: &RgbaImage, config: &TraceConfig) -> Vec<Contour> {
    config.mode.trace(image, config)
}

/// Walk directions over the corner grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Corner bitmask grid between pixels.
struct CornerGrid {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl CornerGrid {
    fn build(image: &RgbaImage, trans_limit: f32) -> Self {
        let (width, height) = image.dimensions();
        let solid = |x: i64, y: i64| -> bool {
            if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                return false;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let alpha = image.get_pixel(x as u32, y as u32)[3];
            f32::from(alpha) / 255.0 >= trans_limit
        };

        let mut cells = vec![0u8; ((width + 1) * (height + 1)) as usize];
        for y in 0..=i64::from(height) {
            for x in 0..=i64::from(width) {
                let mut mask = 0u8;
                if solid(x - 1, y - 1) {
                    mask |= 0x1;
                }
                if solid(x, y - 1) {
                    mask |= 0x2;
                }
                if solid(x - 1, y) {
                    mask |= 0x4;
                }
                if solid(x, y) {
                    mask |= 0x8;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let index = (y as u32 * (width + 1) + x as u32) as usize;
                cells[index] = mask;
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    fn corner(&self, x: u32, y: u32) -> u8 {
        self.cells[(y * (self.width + 1) + x) as usize]
    }
}

/// The counter-clockwise continuation for a corner mask.
///
/// The two saddle masks (`0x6`, `0x9`) have diagonally touching solid
/// pixels and need the previous direction to stay on the same boundary.
/// Returns `None` for masks a valid walk can never stand on (`0x0`,
/// `0xf`, or a saddle reached from an impossible direction).
const fn next_direction(corner: u8, last: Dir) -> Option<Dir> {
    Some(match corner {
        0x1 | 0x5 | 0xd => Dir::Up,
        0x2 | 0x3 | 0x7 => Dir::Right,
        0x4 | 0xc | 0xe => Dir::Left,
        0x8 | 0xa | 0xb => Dir::Down,
        0x6 => match last {
            Dir::Up => Dir::Right,
            Dir::Down => Dir::Left,
            Dir::Left | Dir::Right => return None,
        },
        0x9 => match last {
            Dir::Right => Dir::Down,
            Dir::Left => Dir::Up,
            Dir::Up | Dir::Down => return None,
        },
        _ => return None,
    })
}

/// Follow one boundary from `start` back around to `start`.
///
/// Returns the corner positions in walk order, or `None` if the walk
/// stepped onto an impossible corner or exceeded the step cap (both
/// indicate a corrupted grid, which a well-formed raster cannot
/// produce).
fn walk(grid: &CornerGrid, start: (u32, u32), is_hole: bool) -> Option<Vec<(u32, u32)>> {
    let cap = 4 * ((grid.width + 1) as usize) * ((grid.height + 1) as usize);
    let mut points = vec![start];
    let mut pos = start;
    // The fictitious previous direction that makes the start corner's
    // continuation come out right: an outer start (0x8) is about to go
    // down, a hole start (0x7) is about to go right.
    let mut last_dir = if is_hole { Dir::Up } else { Dir::Left };

    loop {
        let Some(dir) = next_direction(grid.corner(pos.0, pos.1), last_dir) else {
            log::warn!("boundary walk hit an impossible corner at {pos:?}; abandoning contour");
            return None;
        };
        pos = match dir {
            Dir::Up => (pos.0, pos.1 - 1),
            Dir::Down => (pos.0, pos.1 + 1),
            Dir::Left => (pos.0 - 1, pos.1),
            Dir::Right => (pos.0 + 1, pos.1),
        };
        if pos == start {
            return Some(points);
        }
        points.push(pos);
        last_dir = dir;
        if points.len() > cap {
            log::warn!("boundary walk from {start:?} exceeded {cap} steps; abandoning contour");
            return None;
        }
    }
}

fn trace_free(image: &RgbaImage, config: &TraceConfig) -> Vec<Contour> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        log::info!("tracing a zero-size raster; no contours");
        return Vec::new();
    }

    let grid = CornerGrid::build(image, config.trans_limit);
    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut contours = Vec::new();

    let (start_x, start_y) = config.start.unwrap_or((0, 0));
    let mut x = start_x.min(width);
    let mut y = start_y.min(height);
    while y <= height {
        while x <= width {
            let corner = grid.corner(x, y);
            let is_hole = corner == 0x7 && config.include_holes;
            // A walk can only begin on a top-left corner: 0x8 for an
            // outer boundary, 0x7 for a hole boundary.
            if (corner == 0x8 || is_hole) && !visited.contains(&(x, y)) {
                if let Some(mut raw) = walk(&grid, (x, y), is_hole) {
                    visited.extend(raw.iter().copied());
                    if is_hole {
                        // Reverse hole boundaries (keeping the start
                        // point first) so every contour shares the same
                        // winding convention.
                        raw.reverse();
                        raw.rotate_right(1);
                    }
                    #[allow(clippy::cast_precision_loss)]
                    let points = raw
                        .into_iter()
                        .map(|(px, py)| Point::new(px as f32, py as f32))
                        .collect();
                    let mut contour = Contour::new(points);
                    contour.set_hole(is_hole);
                    contours.push(contour);
                }
            }
            x += 1;
        }
        x = 0;
        y += 1;
    }

    if contours.is_empty() {
        log::info!(
            "no contours traced: raster is uniform under threshold {}",
            config.trans_limit,
        );
    }
    contours
}

fn trace_columns(image: &RgbaImage, config: &TraceConfig) -> Vec<Contour> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        log::info!("tracing a zero-size raster; no contours");
        return Vec::new();
    }

    let solid = |x: u32, y: u32| f32::from(image.get_pixel(x, y)[3]) / 255.0 >= config.trans_limit;

    // Maximal vertical solid runs per column, as [start, end) rows.
    let mut columns: Vec<Vec<(u32, u32)>> = Vec::with_capacity(width as usize);
    for x in 0..width {
        let mut runs = Vec::new();
        let mut y = 0;
        while y < height {
            if solid(x, y) {
                let run_start = y;
                while y < height && solid(x, y) {
                    y += 1;
                }
                runs.push((run_start, y));
            } else {
                y += 1;
            }
        }
        columns.push(runs);
    }

    // Adjacent columns with identical run lists merge into one span of
    // rectangles.
    let mut contours = Vec::new();
    let mut x = 0usize;
    while x < columns.len() {
        let mut span_end = x + 1;
        while span_end < columns.len() && columns[span_end] == columns[x] {
            span_end += 1;
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        for &(y0, y1) in &columns[x] {
            let left = x as f32;
            let right = span_end as f32;
            let top = y0 as f32;
            let bottom = y1 as f32;
            contours.push(Contour::new(vec![
                Point::new(left, top),
                Point::new(left, bottom),
                Point::new(right, bottom),
                Point::new(right, top),
            ]));
        }
        x = span_end;
    }

    if contours.is_empty() {
        log::info!(
            "no contours traced: raster is uniform under threshold {}",
            config.trans_limit,
        );
    }
    contours
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    const SOLID: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn raster(width: u32, height: u32, solid_at: impl Fn(u32, u32) -> bool) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if solid_at(x, y) { SOLID } else { CLEAR }
        })
    }

    fn shoelace(points: &[Point]) -> f32 {
        let mut sum = 0.0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            sum += a.perp_dot(b);
        }
        sum
    }

    #[test]
    fn zero_size_raster_yields_no_contours() {
        let img = RgbaImage::new(0, 0);
        assert!(trace(&img, &TraceConfig::default()).is_empty());
    }

    #[test]
    fn transparent_raster_yields_no_contours() {
        let img = raster(8, 8, |_, _| false);
        assert!(trace(&img, &TraceConfig::default()).is_empty());
    }

    #[test]
    fn opaque_square_traces_one_ring() {
        let img = raster(4, 4, |_, _| true);
        let contours = trace(&img, &TraceConfig::default());
        assert_eq!(contours.len(), 1);
        // One point per boundary corner step: 4 sides x 4 steps.
        assert_eq!(contours[0].len(), 16);
        assert_eq!(contours[0].points()[0], Point::new(0.0, 0.0));
        assert!(
            shoelace(contours[0].points()) < 0.0,
            "outer boundary should wind ccw in image coordinates",
        );
    }

    #[test]
    fn single_pixel_traces_four_corners() {
        let img = raster(3, 3, |x, y| x == 1 && y == 1);
        let contours = trace(&img, &TraceConfig::default());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn disjoint_blobs_trace_separately() {
        let img = raster(9, 3, |x, y| y == 1 && (x < 3 || x > 5));
        let contours = trace(&img, &TraceConfig::default());
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn diagonal_pixels_share_a_saddle_corner() {
        // Two diagonally touching pixels walk through the same corner
        // twice and come out as a single figure-eight boundary.
        let img = raster(2, 2, |x, y| x == y);
        let contours = trace(&img, &TraceConfig::default());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 8);
    }

    #[test]
    fn ring_sprite_traces_hole_when_requested() {
        let img = raster(3, 3, |x, y| !(x == 1 && y == 1));
        let without = trace(&img, &TraceConfig::default());
        assert_eq!(without.len(), 1);
        assert!(!without[0].is_hole());

        let config = TraceConfig {
            include_holes: true,
            ..TraceConfig::default()
        };
        let with = trace(&img, &config);
        assert_eq!(with.len(), 2);
        let hole = with.iter().find(|c| c.is_hole()).unwrap();
        assert_eq!(hole.len(), 4);
        assert_eq!(hole.points()[0], Point::new(1.0, 1.0));
        // Reversed to match outer winding.
        assert_eq!(hole.points()[1], Point::new(1.0, 2.0));
    }

    #[test]
    fn threshold_separates_faint_pixels() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 40])
            } else {
                Rgba([255, 255, 255, 200])
            }
        });
        let strict = TraceConfig {
            trans_limit: 0.5,
            ..TraceConfig::default()
        };
        let contours = trace(&img, &strict);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);

        let permissive = TraceConfig {
            trans_limit: 0.1,
            ..TraceConfig::default()
        };
        let contours = trace(&img, &permissive);
        assert_eq!(contours.len(), 1);
        // Both pixels solid now: a 2x1 rectangle, 6 corner steps.
        assert_eq!(contours[0].len(), 6);
    }

    #[test]
    fn start_position_skips_earlier_shapes() {
        let img = raster(9, 3, |x, y| y == 1 && (x < 3 || x > 5));
        // Scan from the middle of the row holding both bars: only the
        // right bar's start corner lies ahead of the scan cursor.
        let config = TraceConfig {
            start: Some((4, 1)),
            ..TraceConfig::default()
        };
        let contours = trace(&img, &config);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points()[0], Point::new(6.0, 1.0));
    }

    #[test]
    fn columns_mode_merges_uniform_runs() {
        // Two solid column groups split by a transparent separator.
        let img = raster(7, 4, |x, _| x < 3 || x > 4);
        let config = TraceConfig {
            mode: TraceMode::Columns,
            ..TraceConfig::default()
        };
        let contours = trace(&img, &config);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            assert_eq!(c.len(), 4, "columns mode emits rectangles");
            assert!(shoelace(c.points()) < 0.0, "rectangles wind ccw");
        }
        assert_eq!(contours[0].points()[0], Point::new(0.0, 0.0));
        assert_eq!(contours[0].points()[2], Point::new(3.0, 4.0));
        assert_eq!(contours[1].points()[0], Point::new(5.0, 0.0));
        assert_eq!(contours[1].points()[2], Point::new(7.0, 4.0));
    }

    #[test]
    fn columns_mode_splits_vertical_runs() {
        // One column with two separate runs yields two rectangles.
        let img = raster(1, 5, |_, y| y != 2);
        let config = TraceConfig {
            mode: TraceMode::Columns,
            ..TraceConfig::default()
        };
        let contours = trace(&img, &config);
        assert_eq!(contours.len(), 2);
    }
}
