//! SVG debug view serializer.
//!
//! Renders an outline's world-space collision geometry into an SVG
//! string using the [`svg`] crate for document construction and XML
//! escaping: each contour becomes a closed `<path>` (holes dashed), and
//! the sub-circles and minimum enclosing disc can be overlaid as
//! `<circle>` elements — the classic way to eyeball why a collision
//! test prunes the way it does.
//!
//! This is a pure function with no I/O — it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle as SvgCircle, Path};

use siluet_collide::{Outline, Point, Transform};

const CONTOUR_COLOR: &str = "#2d7dd2";
const HOLE_COLOR: &str = "#97b1cc";
const SUB_CIRCLE_COLOR: &str = "#e84855";
const DISC_COLOR: &str = "#7bc950";

/// What to include in the SVG besides the contours themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgOptions {
    /// Overlay every contour's sub-circles.
    pub sub_circles: bool,
    /// Overlay the outline's minimum enclosing disc.
    pub enclosing_disc: bool,
}

/// Serialize an outline's world-space geometry into an SVG string.
///
/// The current transform is applied, so the picture matches what the
/// collision tester sees. Bounding overlays are only drawn when the
/// outline is prepared (an unprepared outline has none to draw).
#[must_use]
pub fn to_svg(outline: &Outline, options: &SvgOptions) -> String {
    let transform = Transform {
        translation: outline.translation(),
        rotation: outline.rotation(),
        scale: outline.scale(),
    };
    let radius_scale = transform.radius_scale();

    let mut document = Document::new().set("xmlns", "http://www.w3.org/2000/svg");

    let mut bounds = Bounds::default();
    for contour in outline.contours() {
        for &p in contour.points() {
            bounds.include(transform.apply(p), 0.0);
        }
    }

    for contour in outline.contours() {
        let world: Vec<Point> = contour
            .points()
            .iter()
            .map(|&p| transform.apply(p))
            .collect();
        let Some((&first, rest)) = world.split_first() else {
            continue;
        };

        let mut data = Data::new().move_to((first.x, first.y));
        for p in rest {
            data = data.line_to((p.x, p.y));
        }
        data = data.close();

        let mut path = Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke-width", 0.25)
            .set(
                "stroke",
                if contour.is_hole() {
                    HOLE_COLOR
                } else {
                    CONTOUR_COLOR
                },
            );
        if contour.is_hole() {
            path = path.set("stroke-dasharray", "1 0.5");
        }
        document = document.add(path);

        if options.sub_circles {
            for sc in contour.sub_circles() {
                let center = transform.apply(sc.circle.center);
                let radius = sc.circle.radius * radius_scale;
                bounds.include(center, radius);
                document = document.add(circle_element(center, radius, SUB_CIRCLE_COLOR));
            }
        }
    }

    if options.enclosing_disc
        && let Ok(disc) = outline.bounding_circle()
    {
        bounds.include(disc.center, disc.radius);
        document = document.add(circle_element(disc.center, disc.radius, DISC_COLOR));
    }

    document = document.set("viewBox", bounds.view_box());
    document.to_string()
}

fn circle_element(center: Point, radius: f32, color: &str) -> SvgCircle {
    SvgCircle::new()
        .set("cx", center.x)
        .set("cy", center.y)
        .set("r", radius)
        .set("fill", "none")
        .set("stroke", color)
        .set("stroke-width", 0.25)
}

/// Running bounding box for the `viewBox` attribute.
#[derive(Debug)]
struct Bounds {
    min: Point,
    max: Point,
    any: bool,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Point::ZERO,
            max: Point::ZERO,
            any: false,
        }
    }
}

impl Bounds {
    fn include(&mut self, center: Point, radius: f32) {
        let lo = Point::new(center.x - radius, center.y - radius);
        let hi = Point::new(center.x + radius, center.y + radius);
        if self.any {
            self.min = Point::new(self.min.x.min(lo.x), self.min.y.min(lo.y));
            self.max = Point::new(self.max.x.max(hi.x), self.max.y.max(hi.y));
        } else {
            self.min = lo;
            self.max = hi;
            self.any = true;
        }
    }

    fn view_box(&self) -> (f32, f32, f32, f32) {
        if self.any {
            let margin = 1.0;
            (
                self.min.x - margin,
                self.min.y - margin,
                (self.max.x - self.min.x) + 2.0 * margin,
                (self.max.y - self.min.y) + 2.0 * margin,
            )
        } else {
            (0.0, 0.0, 1.0, 1.0)
        }
    }
}
