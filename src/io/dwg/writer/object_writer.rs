//! Object records writer.
//!
//! Prepares the session copy of the graph (default layer, chain links,
//! owners), rebuilds every wire reference from the [`ObjectMap`], then emits
//! each object as `MS size | data | CRC` in traversal order.

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use tracing::debug;

use crate::entities::Polyline2D;
use crate::error::{DwgError, Result};
use crate::io::dwg::crc;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::{DwgStreamWriter, ObjectMap};
use crate::objects::{stitch_chain, ObjectArena, ObjectId};
use crate::tables::{BlockHeader, Layer};
use crate::types::{DwgVersion, Handle};

/// Name of the layer entities fall back to.
pub const DEFAULT_LAYER_NAME: &str = "0";

/// Emitted object records.
#[derive(Debug, Clone, Default)]
pub struct ObjectsSection {
    pub data: Vec<u8>,
    /// Record offsets relative to the start of `data`
    pub offsets: BTreeMap<Handle, u64>,
}

/// Writer for the object records of one save.
pub struct DwgObjectWriter {
    version: DwgVersion,
    encoding: &'static Encoding,
}

impl DwgObjectWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            version,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Write every object of `map`. `arena` is the session copy of the
    /// drawing and is rewritten in place.
    pub fn write(&self, arena: &mut ObjectArena, map: &ObjectMap) -> Result<ObjectsSection> {
        for &id in map.order() {
            let handle = map.handle_of(id).unwrap_or(Handle::NULL);
            if let Some(object) = arena.get_mut(id) {
                object.common_mut().handle = handle;
            }
        }

        assign_default_layer(arena, map)?;
        link_children(arena, map)?;

        for &id in map.order() {
            object_at(arena, id)?.pre_write(map)?;
        }

        let mut section = ObjectsSection::default();
        for &id in map.order() {
            self.write_record(arena, id, &mut section)?;
        }
        debug!(objects = section.offsets.len(), bytes = section.data.len(), "objects written");
        Ok(section)
    }

    fn write_record(&self, arena: &mut ObjectArena, id: ObjectId, section: &mut ObjectsSection) -> Result<()> {
        let object = object_at(arena, id)?;
        let handle = object.handle();
        let object_type = object.object_type();

        let mut writer = DwgStreamWriter::new(self.version);
        writer.set_encoding(self.encoding);
        writer.write_bit_short(object_type.as_raw());
        object.visit(&mut writer)?;
        let data = writer.finish();

        let size = u32::try_from(data.len())
            .map_err(|_| DwgError::malformed(handle, "object record too large"))?;
        let mut prefix = DwgStreamWriter::new(self.version);
        prefix.write_modular_short(size);

        let start = section.data.len();
        section.data.extend_from_slice(&prefix.finish());
        section.data.extend_from_slice(&data);
        let crc = crc::checksum(&section.data[start..]);
        section.data.extend_from_slice(&crc.to_le_bytes());

        debug!(%handle, %object_type, offset = start, size, "object written");
        section.offsets.insert(handle, start as u64);
        Ok(())
    }
}

fn object_at(arena: &mut ObjectArena, id: ObjectId) -> Result<&mut crate::objects::DwgObject> {
    arena
        .get_mut(id)
        .ok_or_else(|| DwgError::malformed(Handle::NULL, format!("object {} does not exist", id)))
}

/// Entities without a layer are put on layer "0".
fn assign_default_layer(arena: &mut ObjectArena, map: &ObjectMap) -> Result<()> {
    let layer_zero = map.order().iter().copied().find(|&id| {
        arena
            .get_as::<Layer>(id)
            .is_some_and(|l| l.entry.name.eq_ignore_ascii_case(DEFAULT_LAYER_NAME))
    });

    for &id in map.order() {
        let Some(object) = arena.get_mut(id) else {
            continue;
        };
        let handle = object.handle();
        let Some(entity) = object.entity_mut() else {
            continue;
        };
        if entity.layer.is_none() {
            entity.layer = Some(layer_zero.ok_or_else(|| {
                DwgError::malformed(handle, "entity has no layer and the drawing has no layer 0")
            })?);
        }
    }
    Ok(())
}

/// Owners and links of everything a block header, polyline or control owns.
fn link_children(arena: &mut ObjectArena, map: &ObjectMap) -> Result<()> {
    for &id in map.order() {
        let Some(object) = arena.get(id) else {
            continue;
        };

        if let Some(header) = object.as_kind::<BlockHeader>() {
            let chain = header.entities.clone();
            let mode = header.entity_mode();
            let markers = [header.block, header.end_block];
            stitch_chain(arena, map, &chain, id, mode)?;
            for marker in markers.into_iter().flatten() {
                set_owner(arena, marker, id);
            }
        } else if let Some(polyline) = object.as_kind::<Polyline2D>() {
            let chain = polyline.vertices.clone();
            let seq_end = polyline.seq_end;
            let layer = polyline.entity.layer;
            stitch_chain(arena, map, &chain, id, 0)?;

            for child in chain.iter().chain(seq_end) {
                if let Some(entity) = arena.get_mut(child).and_then(|o| o.entity_mut()) {
                    entity.layer = layer;
                }
            }
            if let Some(entity) = seq_end.and_then(|s| arena.get_mut(s)).and_then(|o| o.entity_mut()) {
                entity.common.owner = Some(id);
                entity.entity_mode = 0;
                entity.no_links = true;
                entity.prev_entity = HandleReference::null_of(DwgReferenceType::HardPointer);
                entity.next_entity = HandleReference::null_of(DwgReferenceType::HardPointer);
            }
        } else if object.object_type().is_control() {
            for entry in object.child_ids() {
                set_owner(arena, entry, id);
            }
        }
    }
    Ok(())
}

fn set_owner(arena: &mut ObjectArena, id: ObjectId, owner: ObjectId) {
    if let Some(object) = arena.get_mut(id) {
        object.common_mut().owner = Some(owner);
    }
}
