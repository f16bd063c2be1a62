//! 2D polyline and its vertices

use bitflags::bitflags;

use crate::entities::SeqEnd;
use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{chain_ends, walk_chain, EntityChain, EntityCommon, ObjectId, ObjectKind};
use crate::types::{Handle, Vector3};

bitflags! {
    /// Polyline flags (DXF group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolylineFlags: u16 {
        const CLOSED = 1;
        const CURVE_FIT = 2;
        const SPLINE_FIT = 4;
        const POLYLINE_3D = 8;
        const POLYGON_MESH = 16;
        const CLOSED_N = 32;
        const POLYFACE_MESH = 64;
        const LINETYPE_CONTINUOUS = 128;
    }
}

bitflags! {
    /// Vertex flags (DXF group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VertexFlags: u8 {
        const EXTRA_VERTEX = 1;
        const CURVE_FIT_TANGENT = 2;
        const SPLINE_VERTEX = 8;
        const SPLINE_CONTROL = 16;
        const POLYLINE_3D = 32;
        const POLYGON_MESH = 64;
        const POLYFACE_FACE = 128;
    }
}

/// Smooth surface type (DXF group code 75)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothSurfaceType {
    #[default]
    None = 0,
    QuadraticBSpline = 5,
    CubicBSpline = 6,
    Bezier = 8,
}

impl From<i16> for SmoothSurfaceType {
    fn from(value: i16) -> Self {
        match value {
            5 => SmoothSurfaceType::QuadraticBSpline,
            6 => SmoothSurfaceType::CubicBSpline,
            8 => SmoothSurfaceType::Bezier,
            _ => SmoothSurfaceType::None,
        }
    }
}

/// A vertex in a 2D polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex2D {
    pub entity: EntityCommon,
    pub flags: VertexFlags,
    /// Location of the vertex (X, Y in OCS, Z is elevation)
    pub location: Vector3,
    pub start_width: f64,
    pub end_width: f64,
    /// Bulge (0 = straight segment, <0 = clockwise arc, >0 = counter-clockwise arc)
    pub bulge: f64,
    /// Curve fit tangent direction
    pub tangent_direction: f64,
}

impl Vertex2D {
    pub fn new(location: Vector3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    pub fn with_bulge(location: Vector3, bulge: f64) -> Self {
        Self {
            location,
            bulge,
            ..Default::default()
        }
    }
}

impl Default for Vertex2D {
    fn default() -> Self {
        Self {
            entity: EntityCommon::default(),
            flags: VertexFlags::empty(),
            location: Vector3::ZERO,
            start_width: 0.0,
            end_width: 0.0,
            bulge: 0.0,
            tangent_direction: 0.0,
        }
    }
}

impl ObjectKind for Vertex2D {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Vertex2D;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let mut flags = self.flags.bits();
        io.raw_char(&mut flags)?;
        self.flags = VertexFlags::from_bits_retain(flags);
        io.point3(&mut self.location)?;

        // A negative start width stands for equal start and end widths
        let mut stored = if !io.is_reading()
            && self.start_width == self.end_width
            && self.start_width != 0.0
        {
            -self.start_width.abs()
        } else {
            self.start_width
        };
        io.bit_double(&mut stored)?;
        if stored < 0.0 {
            if io.is_reading() {
                self.start_width = -stored;
                self.end_width = -stored;
            }
        } else {
            self.start_width = stored;
            io.bit_double(&mut self.end_width)?;
        }

        io.bit_double(&mut self.bulge)?;
        io.bit_double(&mut self.tangent_direction)
    }
}

/// A 2D polyline owning a chain of [`Vertex2D`] closed by a [`SeqEnd`]
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline2D {
    pub entity: EntityCommon,
    pub flags: PolylineFlags,
    /// Raw curve/smooth surface type, see [`Polyline2D::smooth_surface`]
    pub curve_type: i16,
    pub start_width: f64,
    pub end_width: f64,
    pub thickness: f64,
    pub elevation: f64,
    pub normal: Vector3,

    pub first_vertex_handle: HandleReference,
    pub last_vertex_handle: HandleReference,
    pub seq_end_handle: HandleReference,

    pub vertices: EntityChain,
    pub seq_end: Option<ObjectId>,
}

impl Polyline2D {
    pub fn new() -> Self {
        Self {
            entity: EntityCommon::default(),
            flags: PolylineFlags::empty(),
            curve_type: 0,
            start_width: 0.0,
            end_width: 0.0,
            thickness: 0.0,
            elevation: 0.0,
            normal: Vector3::UNIT_Z,
            first_vertex_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            last_vertex_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            seq_end_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            vertices: EntityChain::new(),
            seq_end: None,
        }
    }

    pub fn smooth_surface(&self) -> SmoothSurfaceType {
        SmoothSurfaceType::from(self.curve_type)
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(PolylineFlags::CLOSED)
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.flags.set(PolylineFlags::CLOSED, closed);
    }

    fn handle(&self) -> Handle {
        self.entity.common.handle
    }
}

impl Default for Polyline2D {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectKind for Polyline2D {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Polyline2D;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let mut flags = self.flags.bits();
        io.bit_short_u16(&mut flags)?;
        self.flags = PolylineFlags::from_bits_retain(flags);
        io.bit_short(&mut self.curve_type)?;
        io.bit_double(&mut self.start_width)?;
        io.bit_double(&mut self.end_width)?;
        io.thickness(&mut self.thickness)?;
        io.bit_double(&mut self.elevation)?;
        io.extrusion(&mut self.normal)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        io.handle(&mut self.first_vertex_handle)?;
        io.handle(&mut self.last_vertex_handle)?;
        io.handle(&mut self.seq_end_handle)
    }

    fn pose_parse(&mut self, _id: ObjectId, _cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.handle();
        if self.first_vertex_handle.code != DwgReferenceType::HardPointer
            || self.last_vertex_handle.code != DwgReferenceType::HardPointer
        {
            return Err(DwgError::malformed(handle, "incorrect vertex handle code"));
        }
        if self.seq_end_handle.code != DwgReferenceType::SoftPointer {
            return Err(DwgError::malformed(handle, "incorrect seqend handle code"));
        }
        Ok(())
    }

    fn after_read(&mut self, id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.handle();
        self.vertices = walk_chain(
            cache,
            handle,
            &self.first_vertex_handle,
            &self.last_vertex_handle,
            |t| t == DwgObjectType::Vertex2D,
        )?;
        for vertex in self.vertices.iter() {
            cache.set_owner(vertex, id);
        }

        let seq_end = self.seq_end_handle.resolve_next(handle);
        self.seq_end = if seq_end.is_null() {
            None
        } else {
            let seq_end = cache.get_object::<SeqEnd>(seq_end, handle)?;
            cache.set_owner(seq_end, id);
            Some(seq_end)
        };
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        let (first, last) = chain_ends(map, &self.vertices, DwgReferenceType::HardPointer)?;
        self.first_vertex_handle = first;
        self.last_vertex_handle = last;
        self.seq_end_handle = map.reference(DwgReferenceType::SoftPointer, self.seq_end)?;
        Ok(())
    }

    fn child_ids(&self) -> Vec<ObjectId> {
        self.vertices.iter().chain(self.seq_end).collect()
    }
}
