//! Demand-driven object resolution for the read path.
//!
//! Objects are parsed the first time something asks for their handle. A
//! slot is reserved for an object before its references are resolved, so an
//! object reached again while it is still being parsed resolves to its own
//! reserved id instead of being parsed twice.

use std::collections::BTreeMap;

use ahash::AHashMap;
use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{DwgError, Result};
use crate::io::dwg::crc;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::DwgStreamReader;
use crate::objects::{DwgObject, ObjectArena, ObjectId, ObjectKind};
use crate::tables;
use crate::types::{DwgVersion, Handle};

/// Read session state: the file bytes, the object map table and every
/// object resolved so far.
pub struct ObjectCache<'a> {
    file: &'a [u8],
    version: DwgVersion,
    encoding: &'static Encoding,
    offsets: &'a BTreeMap<Handle, u64>,
    /// `None` while the object is being parsed
    slots: Vec<Option<DwgObject>>,
    types: Vec<DwgObjectType>,
    by_handle: AHashMap<Handle, ObjectId>,
}

impl<'a> ObjectCache<'a> {
    /// `offsets` maps handles to absolute offsets into `file`.
    pub fn new(file: &'a [u8], version: DwgVersion, offsets: &'a BTreeMap<Handle, u64>) -> Self {
        Self {
            file,
            version,
            encoding: encoding_rs::WINDOWS_1252,
            offsets,
            slots: Vec::new(),
            types: Vec::new(),
            by_handle: AHashMap::new(),
        }
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Resolve `handle`, which must hold a `T`. `referrer` is the object
    /// asking, reported when the type does not match.
    pub fn get_object<T: ObjectKind>(&mut self, handle: Handle, referrer: Handle) -> Result<ObjectId> {
        let id = self.get_any(handle)?;
        match self.type_of(id) {
            Some(found) if found == T::OBJECT_TYPE => Ok(id),
            found => Err(DwgError::malformed(
                referrer,
                format!(
                    "expected {} at {}, found {}",
                    T::OBJECT_TYPE,
                    handle,
                    found.map(|t| t.to_string()).unwrap_or_default()
                ),
            )),
        }
    }

    /// Resolve `handle` whatever its type.
    pub fn get_any(&mut self, handle: Handle) -> Result<ObjectId> {
        if let Some(&id) = self.by_handle.get(&handle) {
            return Ok(id);
        }
        self.load(handle)
    }

    pub fn type_of(&self, id: ObjectId) -> Option<DwgObjectType> {
        self.types.get(id.0).copied()
    }

    /// A finished object; `None` while it is still being parsed.
    pub fn peek(&self, id: ObjectId) -> Option<&DwgObject> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn peek_mut(&mut self, id: ObjectId) -> Option<&mut DwgObject> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Record `owner` on a finished object.
    pub fn set_owner(&mut self, id: ObjectId, owner: ObjectId) {
        if let Some(object) = self.peek_mut(id) {
            object.common_mut().owner = Some(owner);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// End the session, keying table entries and handing the objects over.
    pub fn finish(self) -> Result<ObjectArena> {
        let handles = self.by_handle_order();
        let items = self
            .slots
            .into_iter()
            .zip(handles)
            .map(|(slot, handle)| {
                slot.ok_or_else(|| DwgError::malformed(handle, "object never finished parsing"))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut arena = ObjectArena::from_items(items);
        tables::link_controls(&mut arena)?;
        Ok(arena)
    }

    fn by_handle_order(&self) -> Vec<Handle> {
        let mut handles = vec![Handle::NULL; self.slots.len()];
        for (&handle, id) in &self.by_handle {
            handles[id.0] = handle;
        }
        handles
    }

    fn load(&mut self, handle: Handle) -> Result<ObjectId> {
        let offset = *self
            .offsets
            .get(&handle)
            .ok_or(DwgError::DanglingHandle(handle))?;
        let start = usize::try_from(offset)
            .map_err(|_| DwgError::corrupt(0, format!("object offset {} out of range", offset)))?;
        if start >= self.file.len() {
            return Err(DwgError::corrupt(
                offset.saturating_mul(8),
                format!("object {} starts past the end of the file", handle),
            ));
        }

        let mut prefix = DwgStreamReader::new_at(self.file, self.version, start);
        let size = prefix.read_modular_short()? as usize;
        let data_start = prefix.position();
        let data_end = data_start + size;
        let (data, stored) = match (
            self.file.get(data_start..data_end),
            self.file.get(data_end..data_end + 2),
        ) {
            (Some(data), Some(crc_bytes)) => (data, LittleEndian::read_u16(crc_bytes)),
            _ => {
                return Err(DwgError::corrupt(
                    (data_start * 8) as u64,
                    format!("object {} runs past the end of the file", handle),
                ))
            }
        };
        let computed = crc::checksum(&self.file[start..data_end]);
        if stored != computed {
            return Err(DwgError::ChecksumMismatch {
                section: format!("object {}", handle),
                expected: stored,
                actual: computed,
            });
        }

        let mut reader = DwgStreamReader::new(data, self.version);
        reader.set_encoding(self.encoding);
        let object_type = DwgObjectType::from_raw(reader.read_bit_short()?)?;
        let mut object = DwgObject::new_of(object_type);
        object.visit(&mut reader)?;
        if object.handle() != handle {
            return Err(DwgError::malformed(
                handle,
                format!("record at offset {} carries handle {}", offset, object.handle()),
            ));
        }

        let id = ObjectId(self.slots.len());
        self.slots.push(None);
        self.types.push(object_type);
        self.by_handle.insert(handle, id);
        debug!(%handle, %object_type, offset, size, "resolving object");

        object.pose_parse(id, self)?;
        object.after_read(id, self)?;
        self.slots[id.0] = Some(object);
        Ok(id)
    }
}
