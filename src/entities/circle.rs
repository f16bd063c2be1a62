//! Circle entity

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{EntityCommon, ObjectKind};
use crate::types::Vector3;

/// A circle entity
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub entity: EntityCommon,
    pub center: Vector3,
    pub radius: f64,
    pub thickness: f64,
    pub normal: Vector3,
}

impl Circle {
    pub fn new() -> Self {
        Circle {
            entity: EntityCommon::default(),
            center: Vector3::ZERO,
            radius: 1.0,
            thickness: 0.0,
            normal: Vector3::UNIT_Z,
        }
    }

    pub fn from_center_radius(center: Vector3, radius: f64) -> Self {
        Circle {
            center,
            radius,
            ..Self::new()
        }
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new()
    }
}

/// Center, radius, thickness and extrusion, shared with arcs.
pub(crate) fn visit_circle_fields<F: FieldIo>(
    io: &mut F,
    center: &mut Vector3,
    radius: &mut f64,
    thickness: &mut f64,
    normal: &mut Vector3,
) -> Result<()> {
    io.point3(center)?;
    io.bit_double(radius)?;
    io.thickness(thickness)?;
    io.extrusion(normal)
}

impl ObjectKind for Circle {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Circle;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_circle_fields(
            io,
            &mut self.center,
            &mut self.radius,
            &mut self.thickness,
            &mut self.normal,
        )
    }
}
