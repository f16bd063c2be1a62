//! Block and EndBlock entities, the markers opening and closing a block
//! definition

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{EntityCommon, ObjectKind};

/// Block entity - marks the beginning of a block definition
///
/// The name mirrors the owning block header's name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub entity: EntityCommon,
    pub name: String,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entity: EntityCommon::default(),
            name: name.into(),
        }
    }
}

impl ObjectKind for Block {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Block;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        io.text(&mut self.name)
    }
}

/// EndBlock entity - marks the end of a block definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndBlock {
    pub entity: EntityCommon,
}

impl EndBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectKind for EndBlock {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::EndBlock;

    entity_accessors!();

    fn fields<F: FieldIo>(&mut self, _io: &mut F) -> Result<()> {
        Ok(())
    }
}
