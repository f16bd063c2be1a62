//! Arc entity

use super::circle::visit_circle_fields;
use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{EntityCommon, ObjectKind};
use crate::types::Vector3;

/// A circular arc, angles in radians counter-clockwise from the X axis
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub entity: EntityCommon,
    pub center: Vector3,
    pub radius: f64,
    pub thickness: f64,
    pub normal: Vector3,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Arc {
    pub fn new() -> Self {
        Arc {
            entity: EntityCommon::default(),
            center: Vector3::ZERO,
            radius: 1.0,
            thickness: 0.0,
            normal: Vector3::UNIT_Z,
            start_angle: 0.0,
            end_angle: std::f64::consts::PI,
        }
    }

    pub fn from_center_radius_angles(
        center: Vector3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Arc {
            center,
            radius,
            start_angle,
            end_angle,
            ..Self::new()
        }
    }
}

impl Default for Arc {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectKind for Arc {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Arc;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_circle_fields(
            io,
            &mut self.center,
            &mut self.radius,
            &mut self.thickness,
            &mut self.normal,
        )?;
        io.bit_double(&mut self.start_angle)?;
        io.bit_double(&mut self.end_angle)
    }
}
