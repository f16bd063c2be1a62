//! Data shared by every record and by every entity, and the record layout
//! around the type-specific fields.

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::{read_count, wire_count, FieldIo};
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{ObjectId, ObjectKind};
use crate::tables::{Layer, LineType};
use crate::types::{Color, Handle};
use crate::xdata::{visit_extended_data, ExtendedDataRecord};

/// Fields every record carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCommon {
    /// Own handle, null until assigned on save
    pub handle: Handle,
    /// Owner reference as stored in the handle section
    pub owner_handle: HandleReference,
    /// Owning object in memory
    pub owner: Option<ObjectId>,
    pub reactors: Vec<HandleReference>,
    pub xdictionary: HandleReference,
    pub extended_data: Vec<ExtendedDataRecord>,
}

impl Default for ObjectCommon {
    fn default() -> Self {
        Self {
            handle: Handle::NULL,
            owner_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            owner: None,
            reactors: Vec::new(),
            xdictionary: HandleReference::null_of(DwgReferenceType::SoftPointer),
            extended_data: Vec::new(),
        }
    }
}

/// Fields every entity carries on top of [`ObjectCommon`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    pub common: ObjectCommon,
    /// Proxy graphics, when present
    pub graphic_data: Option<Vec<u8>>,
    /// 0 owner stored, 1 paper space, 2 model space
    pub entity_mode: u8,
    /// Set when the neighbors are the adjacent handles; the links are
    /// then implied and not stored
    pub no_links: bool,
    pub color: Color,
    pub line_type_scale: f64,
    /// 0 by layer, 1 by block, 2 continuous, 3 explicit handle
    pub line_type_flags: u8,
    /// 0 by layer, 1 by block, 2 default, 3 explicit handle
    pub plot_style_flags: u8,
    pub invisibility: i16,
    pub line_weight: u8,

    pub layer_handle: HandleReference,
    pub line_type_handle: HandleReference,
    pub prev_entity: HandleReference,
    pub next_entity: HandleReference,
    pub plot_style_handle: HandleReference,

    pub layer: Option<ObjectId>,
    /// Explicit linetype; `None` follows `line_type_flags`
    pub line_type: Option<ObjectId>,
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self {
            common: ObjectCommon::default(),
            graphic_data: None,
            entity_mode: 0,
            no_links: false,
            color: Color::BY_LAYER,
            line_type_scale: 1.0,
            line_type_flags: 0,
            plot_style_flags: 0,
            invisibility: 0,
            // ByLayer
            line_weight: 29,
            layer_handle: HandleReference::null_of(DwgReferenceType::SoftOwner),
            line_type_handle: HandleReference::null_of(DwgReferenceType::SoftOwner),
            prev_entity: HandleReference::null_of(DwgReferenceType::HardPointer),
            next_entity: HandleReference::null_of(DwgReferenceType::HardPointer),
            plot_style_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            layer: None,
            line_type: None,
        }
    }
}

impl EntityCommon {
    pub fn is_invisible(&self) -> bool {
        self.invisibility & 1 != 0
    }

    pub fn set_invisible(&mut self, invisible: bool) {
        if invisible {
            self.invisibility |= 1;
        } else {
            self.invisibility &= !1;
        }
    }

    pub fn is_line_type_by_layer(&self) -> bool {
        self.line_type_flags == 0
    }

    fn visit_prefix<F: FieldIo>(
        &mut self,
        io: &mut F,
        handle_section: &mut u32,
        reactor_count: &mut i32,
    ) -> Result<()> {
        let sio = io.sio();
        let owner = self.common.handle;

        let mut has_graphics = self.graphic_data.is_some();
        io.bit(&mut has_graphics)?;
        if has_graphics {
            let mut data = self.graphic_data.take().unwrap_or_default();
            let mut size: i32 = wire_count(data.len(), owner, "graphic bytes")?;
            io.raw_long(&mut size)?;
            io.raw_bytes(&mut data, read_count(size as i64, owner, "graphic byte")?)?;
            self.graphic_data = Some(data);
        } else {
            self.graphic_data = None;
        }

        if sio.r13_14_only {
            io.handle_section_offset(handle_section)?;
        }

        io.bits2(&mut self.entity_mode)?;
        io.bit_long(reactor_count)?;

        if sio.r13_14_only {
            let mut by_layer = self.line_type_flags != 3;
            io.bit(&mut by_layer)?;
            if io.is_reading() {
                self.line_type_flags = if by_layer { 0 } else { 3 };
            }
        }

        io.bit(&mut self.no_links)?;
        io.color(&mut self.color)?;
        io.bit_double(&mut self.line_type_scale)?;

        if sio.r2000_plus {
            io.bits2(&mut self.line_type_flags)?;
            io.bits2(&mut self.plot_style_flags)?;
        }

        io.bit_short(&mut self.invisibility)?;

        if sio.r2000_plus {
            io.raw_char(&mut self.line_weight)?;
        }
        Ok(())
    }

    fn visit_handles<F: FieldIo>(&mut self, io: &mut F, reactor_count: usize) -> Result<()> {
        let sio = io.sio();

        if self.entity_mode == 0 {
            io.handle(&mut self.common.owner_handle)?;
        }
        io.repeated(&mut self.common.reactors, reactor_count, |io, r| io.handle(r))?;
        io.handle(&mut self.common.xdictionary)?;

        io.handle(&mut self.layer_handle)?;
        if self.line_type_flags == 3 {
            io.handle(&mut self.line_type_handle)?;
        }

        if !self.no_links {
            io.handle(&mut self.prev_entity)?;
            io.handle(&mut self.next_entity)?;
        } else if io.is_reading() {
            self.prev_entity = HandleReference::new(DwgReferenceType::MinusOne, 0);
            self.next_entity = HandleReference::new(DwgReferenceType::PlusOne, 0);
        }

        if sio.r2000_plus && self.plot_style_flags == 3 {
            io.handle(&mut self.plot_style_handle)?;
        }
        Ok(())
    }

    fn pose_parse(&mut self, cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.common.handle;

        if self.layer_handle.code != DwgReferenceType::SoftOwner {
            return Err(DwgError::malformed(handle, "incorrect layer handle code"));
        }
        if self.line_type_flags == 3
            && (self.line_type_handle.is_empty()
                || self.line_type_handle.code != DwgReferenceType::SoftOwner)
        {
            return Err(DwgError::malformed(handle, "incorrect line type handle code"));
        }
        if !self.no_links {
            for link in [&self.prev_entity, &self.next_entity] {
                if !link.is_empty() && link.code.is_ownership() {
                    return Err(DwgError::malformed(handle, "incorrect entity link handle code"));
                }
            }
        }

        let layer = self.layer_handle.resolve_next(handle);
        self.layer = if layer.is_null() {
            None
        } else {
            Some(cache.get_object::<Layer>(layer, handle)?)
        };

        self.line_type = if self.line_type_flags == 3 {
            let target = self.line_type_handle.resolve_next(handle);
            Some(cache.get_object::<LineType>(target, handle)?)
        } else {
            None
        };
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        self.layer_handle = map.reference(DwgReferenceType::SoftOwner, self.layer)?;
        match self.line_type {
            Some(id) => {
                self.line_type_flags = 3;
                self.line_type_handle = map.reference(DwgReferenceType::SoftOwner, Some(id))?;
            }
            None => {
                if self.line_type_flags == 3 {
                    self.line_type_flags = 0;
                }
                self.line_type_handle = HandleReference::null_of(DwgReferenceType::SoftOwner);
            }
        }
        if self.plot_style_flags == 3 && self.plot_style_handle.value == 0 {
            self.plot_style_flags = 0;
        }
        Ok(())
    }
}

/// Everything after the type tag: own handle, EED, common prefix,
/// type fields, then the handle section.
pub(crate) fn visit_object<T: ObjectKind, F: FieldIo>(object: &mut T, io: &mut F) -> Result<()> {
    let sio = io.sio();
    let mut handle_section = 0u32;
    if sio.r2000_plus {
        io.handle_section_offset(&mut handle_section)?;
    }

    let handle = {
        let common = object.common_mut();
        io.absolute_handle(&mut common.handle, DwgReferenceType::None)?;
        visit_extended_data(io, &mut common.extended_data, common.handle)?;
        common.handle
    };

    let mut reactor_count: i32 = wire_count(object.common().reactors.len(), handle, "reactors")?;
    if let Some(entity) = object.entity_mut() {
        entity.visit_prefix(io, &mut handle_section, &mut reactor_count)?;
    } else {
        if sio.r13_14_only {
            io.handle_section_offset(&mut handle_section)?;
        }
        io.bit_long(&mut reactor_count)?;
    }
    let reactor_count = read_count(reactor_count as i64, handle, "reactor")?;

    object.fields(io)?;
    io.enter_handle_section(handle_section, handle)?;

    if let Some(entity) = object.entity_mut() {
        entity.visit_handles(io, reactor_count)?;
    } else {
        let common = object.common_mut();
        io.handle(&mut common.owner_handle)?;
        io.repeated(&mut common.reactors, reactor_count, |io, r| io.handle(r))?;
        io.handle(&mut common.xdictionary)?;
    }

    object.post_data(io)
}

/// Entity checks and resolution, the table entry backlink, then the type
/// hook.
pub(crate) fn pose_parse<T: ObjectKind>(
    object: &mut T,
    id: ObjectId,
    cache: &mut ObjectCache<'_>,
) -> Result<()> {
    if let Some(entity) = object.entity_mut() {
        entity.pose_parse(cache)?;
    }
    if object.table_entry().is_some() {
        resolve_control_backlink(object, cache)?;
    }
    object.pose_parse(id, cache)
}

/// A table entry's owner must be a HardPointer to the control of its type.
/// Whether that control really lists the entry is checked once every
/// record is loaded.
fn resolve_control_backlink<T: ObjectKind>(object: &mut T, cache: &mut ObjectCache<'_>) -> Result<()> {
    let common = object.common();
    let handle = common.handle;
    if common.owner_handle.code != DwgReferenceType::HardPointer {
        return Err(DwgError::malformed(handle, "incorrect control backlink handle code"));
    }
    let target = common.owner_handle.resolve_next(handle);
    if target.is_null() {
        return Ok(());
    }

    let Some(expected) = T::OBJECT_TYPE.control_type() else {
        return Ok(());
    };
    let control = cache.get_any(target)?;
    if cache.type_of(control) != Some(expected) {
        return Err(DwgError::malformed(
            handle,
            format!("backlink {} is not a {}", target, expected),
        ));
    }
    object.common_mut().owner = Some(control);
    Ok(())
}

/// Owner and entity references from the in-memory links, then the type hook.
pub(crate) fn pre_write<T: ObjectKind>(object: &mut T, map: &ObjectMap) -> Result<()> {
    let owner_code = if object.table_entry().is_some() {
        DwgReferenceType::HardPointer
    } else {
        DwgReferenceType::SoftPointer
    };
    let owner = object.common().owner;
    object.common_mut().owner_handle = map.reference(owner_code, owner)?;

    if let Some(entity) = object.entity_mut() {
        entity.pre_write(map)?;
    }
    object.pre_write(map)
}
