//! Class definitions from the `AcDb:Classes` block
//!
//! R13 through R2000 list custom classes with numbers starting at 500. The
//! codec does not interpret instances of these classes, but keeps the
//! records so that a saved drawing carries the same table.

use indexmap::IndexMap;

use crate::error::Result;
use crate::io::dwg::constants::CLASS_ID_ENTITY;
use crate::io::dwg::field_io::FieldIo;

/// A single class record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DwgClass {
    /// Type number used by instances of this class (500 and up)
    pub class_number: i16,
    /// Proxy capability flags
    pub proxy_flags: i16,
    pub application_name: String,
    pub cpp_class_name: String,
    /// Name used in DXF output
    pub dxf_name: String,
    pub was_zombie: bool,
    /// 0x1F2 for entities, 0x1F3 for objects
    pub item_class_id: i16,
}

impl DwgClass {
    pub fn new(class_number: i16, dxf_name: impl Into<String>, cpp_class_name: impl Into<String>) -> Self {
        Self {
            class_number,
            dxf_name: dxf_name.into(),
            cpp_class_name: cpp_class_name.into(),
            application_name: "ObjectDBX Classes".to_string(),
            item_class_id: 0x1F3,
            ..Default::default()
        }
    }

    /// True when instances of the class are entities.
    pub fn is_entity(&self) -> bool {
        self.item_class_id == CLASS_ID_ENTITY
    }

    pub(crate) fn visit<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        io.bit_short(&mut self.class_number)?;
        io.bit_short(&mut self.proxy_flags)?;
        io.text(&mut self.application_name)?;
        io.text(&mut self.cpp_class_name)?;
        io.text(&mut self.dxf_name)?;
        io.bit(&mut self.was_zombie)?;
        io.bit_short(&mut self.item_class_id)
    }
}

/// Classes keyed by DXF name, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DwgClassCollection {
    entries: IndexMap<String, DwgClass>,
}

impl DwgClassCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class, replacing an existing one with the same DXF name.
    pub fn add_or_update(&mut self, class: DwgClass) {
        self.entries.insert(class.dxf_name.clone(), class);
    }

    pub fn get(&self, dxf_name: &str) -> Option<&DwgClass> {
        self.entries.get(dxf_name)
    }

    pub fn by_number(&self, class_number: i16) -> Option<&DwgClass> {
        self.entries.values().find(|c| c.class_number == class_number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DwgClass> {
        self.entries.values()
    }
}
