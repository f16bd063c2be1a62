//! Seqend entity: end-of-sequence marker for polyline vertices

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{EntityCommon, ObjectKind};

/// Marker entity signaling the end of a vertex sequence.
///
/// Seqend has no entity-specific data. It only carries the common entity
/// fields; its owner is the polyline that closes with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeqEnd {
    pub entity: EntityCommon,
}

impl SeqEnd {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectKind for SeqEnd {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::SeqEnd;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, _io: &mut F) -> Result<()> {
        Ok(())
    }
}
