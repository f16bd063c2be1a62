//! Layer table entry

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{ObjectCommon, ObjectId, ObjectKind, TableEntryData};
use crate::tables::LineType;
use crate::types::Color;

const FROZEN: i16 = 1;
const OFF: i16 = 2;
const FROZEN_IN_NEW_VIEWPORTS: i16 = 4;
const LOCKED: i16 = 8;
const PLOTTED: i16 = 16;

/// A layer table entry
///
/// `flags` holds the frozen, off, frozen-in-new-viewports, locked and
/// plotted bits; the boolean accessors read and write it.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub common: ObjectCommon,
    pub entry: TableEntryData,
    pub flags: i16,
    pub color: Color,

    /// Plot style placeholder, R2000
    pub plot_style_handle: HandleReference,
    pub line_type_handle: HandleReference,

    pub line_type: Option<ObjectId>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Layer {
            entry: TableEntryData::new(name),
            ..Default::default()
        }
    }

    fn flag(&self, bit: i16) -> bool {
        self.flags & bit != 0
    }

    fn set_flag(&mut self, bit: i16, value: bool) {
        if value {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.flag(FROZEN)
    }

    pub fn set_frozen(&mut self, value: bool) {
        self.set_flag(FROZEN, value);
    }

    pub fn is_on(&self) -> bool {
        !self.flag(OFF)
    }

    pub fn set_on(&mut self, value: bool) {
        self.set_flag(OFF, !value);
    }

    pub fn is_frozen_in_new_viewports(&self) -> bool {
        self.flag(FROZEN_IN_NEW_VIEWPORTS)
    }

    pub fn set_frozen_in_new_viewports(&mut self, value: bool) {
        self.set_flag(FROZEN_IN_NEW_VIEWPORTS, value);
    }

    pub fn is_locked(&self) -> bool {
        self.flag(LOCKED)
    }

    pub fn set_locked(&mut self, value: bool) {
        self.set_flag(LOCKED, value);
    }

    pub fn is_plotted(&self) -> bool {
        self.flag(PLOTTED)
    }

    pub fn set_plotted(&mut self, value: bool) {
        self.set_flag(PLOTTED, value);
    }
}

impl Default for Layer {
    fn default() -> Self {
        Layer {
            common: ObjectCommon::default(),
            entry: TableEntryData::default(),
            flags: PLOTTED,
            color: Color(7),
            plot_style_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            line_type_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            line_type: None,
        }
    }
}

impl ObjectKind for Layer {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Layer;

    table_entry_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_prefix(io)?;

        if io.sio().r13_14_only {
            let mut frozen = self.is_frozen();
            let mut on = self.is_on();
            let mut frozen_new = self.is_frozen_in_new_viewports();
            let mut locked = self.is_locked();
            io.bit(&mut frozen)?;
            io.bit(&mut on)?;
            io.bit(&mut frozen_new)?;
            io.bit(&mut locked)?;
            if io.is_reading() {
                self.set_frozen(frozen);
                self.set_on(on);
                self.set_frozen_in_new_viewports(frozen_new);
                self.set_locked(locked);
            }
        } else {
            io.bit_short(&mut self.flags)?;
        }

        io.color(&mut self.color)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_xref_block(io)?;
        if io.sio().r2000_plus {
            io.handle(&mut self.plot_style_handle)?;
        }
        io.handle(&mut self.line_type_handle)
    }

    fn pose_parse(&mut self, _id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.common.handle;
        if self.line_type_handle.code != DwgReferenceType::HardPointer {
            return Err(DwgError::malformed(handle, "incorrect line type handle code"));
        }
        let target = self.line_type_handle.resolve_next(handle);
        self.line_type = if target.is_null() {
            None
        } else {
            Some(cache.get_object::<LineType>(target, handle)?)
        };
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        self.line_type_handle = map.reference(DwgReferenceType::HardPointer, self.line_type)?;
        Ok(())
    }
}
