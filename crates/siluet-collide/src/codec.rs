//! Binary persistence for outline geometry.
//!
//! Tracing and preparing a sprite outline is much slower than reading
//! it back, so pregenerated outlines are stored in a compact
//! little-endian stream and reloaded at startup:
//!
//! ```text
//! [magic "SLTO": 4 bytes][version: u32][contour count: u32]
//! per contour:
//!   [point count: u32][point count x (f32 x, f32 y)]
//!   [sub-circle count: u32]
//!   [sub-circle count x (f32 cx, f32 cy, f32 radius, i32 start, i32 end)]
//!   [hole flag: u8]
//!   [cached bounding radius: f32][centroid: f32 x, f32 y]
//! ```
//!
//! Only local-space geometry is persisted; the transform is runtime
//! state. The round trip is bit-exact for every stored value, which is
//! why the engine stores `f32` coordinates in the first place.

use std::io::{self, Read, Write};

use crate::contour::{Contour, SubCircle};
use crate::outline::Outline;
use crate::types::{Circle, OutlineError, Point};

const MAGIC: [u8; 4] = *b"SLTO";
const VERSION: u32 = 1;

impl Outline {
    /// Write the outline's local-space geometry to `writer`.
    ///
    /// An unprepared outline saves with empty sub-circle lists and will
    /// load back unprepared.
    ///
    /// # Errors
    ///
    /// [`OutlineError::Io`] on write failure;
    /// [`OutlineError::Format`] if a contour is too large for the
    /// format's 32-bit counters.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), OutlineError> {
        writer.write_all(&MAGIC)?;
        write_u32(writer, VERSION)?;
        write_u32(writer, checked_u32(self.contours().len())?)?;

        for contour in self.contours() {
            write_u32(writer, checked_u32(contour.len())?)?;
            for p in contour.points() {
                write_f32(writer, p.x)?;
                write_f32(writer, p.y)?;
            }

            write_u32(writer, checked_u32(contour.sub_circles().len())?)?;
            for sc in contour.sub_circles() {
                write_f32(writer, sc.circle.center.x)?;
                write_f32(writer, sc.circle.center.y)?;
                write_f32(writer, sc.circle.radius)?;
                write_i32(writer, checked_i32(sc.start)?)?;
                write_i32(writer, checked_i32(sc.end)?)?;
            }

            writer.write_all(&[u8::from(contour.is_hole())])?;
            write_f32(writer, contour.bounding_radius())?;
            write_f32(writer, contour.centroid().x)?;
            write_f32(writer, contour.centroid().y)?;
        }
        Ok(())
    }

    /// Read outline geometry previously written by
    /// [`save`](Self::save).
    ///
    /// The outline-level bounding disc is recomputed from the loaded
    /// points; per-contour caches come straight from the stream. A
    /// stream written from a prepared outline loads ready for collision
    /// queries.
    ///
    /// # Errors
    ///
    /// [`OutlineError::Format`] on a wrong magic tag, truncated data,
    /// or out-of-range sub-circle indices;
    /// [`OutlineError::UnsupportedVersion`] when the version tag is
    /// unknown; [`OutlineError::Io`] on other read failures.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, OutlineError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(map_eof)?;
        if magic != MAGIC {
            return Err(OutlineError::Format(format!(
                "bad magic tag {magic:02x?}; not an outline stream",
            )));
        }
        let version = read_u32(reader)?;
        if version != VERSION {
            return Err(OutlineError::UnsupportedVersion(version));
        }

        let contour_count = read_u32(reader)? as usize;
        let mut contours = Vec::with_capacity(contour_count.min(1024));
        for _ in 0..contour_count {
            contours.push(read_contour(reader)?);
        }

        let mut outline = Self::new(contours);
        outline.restore_outline_disc();
        Ok(outline)
    }
}

fn read_contour<R: Read>(reader: &mut R) -> Result<Contour, OutlineError> {
    let point_count = read_u32(reader)? as usize;
    let mut points = Vec::with_capacity(point_count.min(65_536));
    for _ in 0..point_count {
        let x = read_f32(reader)?;
        let y = read_f32(reader)?;
        points.push(Point::new(x, y));
    }

    let sub_count = read_u32(reader)? as usize;
    let mut sub_circles = Vec::with_capacity(sub_count.min(65_536));
    for _ in 0..sub_count {
        let cx = read_f32(reader)?;
        let cy = read_f32(reader)?;
        let radius = read_f32(reader)?;
        let start = read_index(reader)?;
        let end = read_index(reader)?;
        if start >= end || end > point_count {
            return Err(OutlineError::Format(format!(
                "sub-circle range [{start}, {end}) outside contour of {point_count} points",
            )));
        }
        sub_circles.push(SubCircle {
            circle: Circle::new(Point::new(cx, cy), radius),
            start,
            end,
        });
    }

    let is_hole = match read_u8(reader)? {
        0 => false,
        1 => true,
        other => {
            return Err(OutlineError::Format(format!(
                "invalid hole flag {other}; expected 0 or 1",
            )));
        }
    };
    let bounding_radius = read_f32(reader)?;
    let centroid_x = read_f32(reader)?;
    let centroid_y = read_f32(reader)?;

    Ok(Contour::from_parts(
        points,
        sub_circles,
        Point::new(centroid_x, centroid_y),
        bounding_radius,
        is_hole,
    ))
}

fn checked_u32(value: usize) -> Result<u32, OutlineError> {
    u32::try_from(value)
        .map_err(|_| OutlineError::Format("contour too large for the outline format".into()))
}

fn checked_i32(value: usize) -> Result<i32, OutlineError> {
    i32::try_from(value)
        .map_err(|_| OutlineError::Format("sub-circle index too large for the outline format".into()))
}

fn map_eof(err: io::Error) -> OutlineError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        OutlineError::Format("truncated outline data".into())
    } else {
        OutlineError::Io(err)
    }
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, OutlineError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf).map_err(map_eof)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, OutlineError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(map_eof)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_index<R: Read>(reader: &mut R) -> Result<usize, OutlineError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(map_eof)?;
    let value = i32::from_le_bytes(buf);
    usize::try_from(value)
        .map_err(|_| OutlineError::Format(format!("negative sub-circle index {value}")))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, OutlineError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(map_eof)?;
    Ok(f32::from_le_bytes(buf))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn prepared_outline() -> Outline {
        let mut contour = Contour::new(vec![
            Point::new(0.5, 0.25),
            Point::new(0.5, 7.75),
            Point::new(3.25, 9.5),
            Point::new(6.5, 7.75),
            Point::new(6.5, 0.25),
            Point::new(3.25, -1.5),
        ]);
        contour.set_hole(false);
        let mut hole = Contour::new(vec![
            Point::new(2.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 2.0),
        ]);
        hole.set_hole(true);
        let mut outline = Outline::new(vec![contour, hole]);
        outline.prepare(3);
        outline
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let outline = prepared_outline();
        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();

        let loaded = Outline::load(&mut buffer.as_slice()).unwrap();
        assert_eq!(loaded.contours(), outline.contours());
        assert!(loaded.is_prepared());
    }

    #[test]
    fn loaded_outline_collides_like_the_original() {
        let outline = prepared_outline();
        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();
        let mut loaded = Outline::load(&mut buffer.as_slice()).unwrap();

        loaded.set_translation(3.0, 0.0);
        let mut original = outline.clone();
        original.set_translation(3.0, 0.0);
        assert_eq!(
            outline.collide(&loaded).unwrap(),
            outline.collide(&original).unwrap(),
        );
    }

    #[test]
    fn transform_is_not_persisted() {
        let mut outline = prepared_outline();
        outline.set_translation(40.0, -3.0);
        outline.set_rotation(1.2);

        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();
        let loaded = Outline::load(&mut buffer.as_slice()).unwrap();
        assert_eq!(loaded.translation(), Point::ZERO);
        assert!(loaded.rotation().abs() < f32::EPSILON);
    }

    #[test]
    fn unprepared_outline_round_trips_unprepared() {
        let outline = Outline::new(vec![Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 1.0),
        ])]);
        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();
        let loaded = Outline::load(&mut buffer.as_slice()).unwrap();
        assert!(!loaded.is_prepared());
        assert_eq!(loaded.contours(), outline.contours());
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let result = Outline::load(&mut &b"PNG\x0d0000"[..]);
        assert!(matches!(result, Err(OutlineError::Format(_))));
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&99u32.to_le_bytes());
        buffer.extend_from_slice(&0u32.to_le_bytes());
        let result = Outline::load(&mut buffer.as_slice());
        assert!(matches!(result, Err(OutlineError::UnsupportedVersion(99))));
    }

    #[test]
    fn truncated_stream_is_a_format_error() {
        let outline = prepared_outline();
        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();
        buffer.truncate(buffer.len() - 7);

        let result = Outline::load(&mut buffer.as_slice());
        assert!(matches!(result, Err(OutlineError::Format(_))));
    }

    #[test]
    fn out_of_range_sub_circle_is_rejected() {
        let mut contour = Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 1.0),
        ]);
        contour.calculate_sub_circles(8);
        let outline = Outline::new(vec![contour]);

        let mut buffer = Vec::new();
        outline.save(&mut buffer).unwrap();
        // Corrupt the sub-circle end index (last 4 bytes of the
        // sub-circle record, which sits before flag+radius+centroid).
        let end_offset = buffer.len() - 13 - 4;
        buffer[end_offset..end_offset + 4].copy_from_slice(&900i32.to_le_bytes());

        let result = Outline::load(&mut buffer.as_slice());
        assert!(matches!(result, Err(OutlineError::Format(_))));
    }
}
