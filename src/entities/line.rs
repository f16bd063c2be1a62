//! Line entity

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{EntityCommon, ObjectKind};
use crate::types::Vector3;

/// A line entity defined by two endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Common entity data
    pub entity: EntityCommon,
    /// Start point of the line
    pub start: Vector3,
    /// End point of the line
    pub end: Vector3,
    /// Thickness (extrusion in Z direction)
    pub thickness: f64,
    /// Normal vector
    pub normal: Vector3,
}

impl Line {
    /// Create a new line from origin to origin
    pub fn new() -> Self {
        Line {
            entity: EntityCommon::default(),
            start: Vector3::ZERO,
            end: Vector3::ZERO,
            thickness: 0.0,
            normal: Vector3::UNIT_Z,
        }
    }

    /// Create a new line between two points
    pub fn from_points(start: Vector3, end: Vector3) -> Self {
        Line {
            start,
            end,
            ..Self::new()
        }
    }

    /// Create a new line from coordinates
    pub fn from_coords(x1: f64, y1: f64, z1: f64, x2: f64, y2: f64, z2: f64) -> Self {
        Line::from_points(Vector3::new(x1, y1, z1), Vector3::new(x2, y2, z2))
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectKind for Line {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Line;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        if io.sio().r13_14_only {
            io.point3(&mut self.start)?;
            io.point3(&mut self.end)?;
        } else {
            // R2000 packs the end point as defaults against the start point
            let mut z_is_zero = self.start.z == 0.0 && self.end.z == 0.0;
            io.bit(&mut z_is_zero)?;
            io.raw_double(&mut self.start.x)?;
            io.bit_double_default(&mut self.end.x, self.start.x)?;
            io.raw_double(&mut self.start.y)?;
            io.bit_double_default(&mut self.end.y, self.start.y)?;
            if !z_is_zero {
                io.raw_double(&mut self.start.z)?;
                io.bit_double_default(&mut self.end.z, self.start.z)?;
            } else if io.is_reading() {
                self.start.z = 0.0;
                self.end.z = 0.0;
            }
        }
        io.thickness(&mut self.thickness)?;
        io.extrusion(&mut self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    fn fields_round_trip(line: &Line, version: DwgVersion) -> (Line, usize) {
        let mut source = line.clone();
        let mut writer = DwgStreamWriter::new(version);
        source.fields(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut reader = DwgStreamReader::new(&bytes, version);
        let mut parsed = Line::default();
        parsed.fields(&mut reader).unwrap();
        (parsed, bytes.len())
    }

    #[test]
    fn test_line_creation() {
        let line = Line::from_coords(0.0, 0.0, 0.0, 3.0, 4.0, 0.0);
        assert_eq!(line.end, Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(line.normal, Vector3::UNIT_Z);
    }

    #[test]
    fn test_fields_every_version() {
        let line = Line::from_coords(1.5, -2.0, 0.0, 10.0, 20.0, 7.25);
        for version in DwgVersion::ALL {
            let (parsed, _) = fields_round_trip(&line, version);
            assert_eq!(parsed.start, line.start);
            assert_eq!(parsed.end, line.end);
        }
    }

    #[test]
    fn test_r2000_flat_line_is_compact() {
        let flat = Line::from_coords(1.0, 2.0, 0.0, 1.0, 2.0, 0.0);
        let (parsed, flat_len) = fields_round_trip(&flat, DwgVersion::AC1015);
        assert_eq!(parsed, flat);
        let (_, r14_len) = fields_round_trip(&flat, DwgVersion::AC1014);
        assert!(flat_len < r14_len);
    }
}
