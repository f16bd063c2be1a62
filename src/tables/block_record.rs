//! Block header table entry and the block control object

use crate::entities::{Block, EndBlock};
use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::{read_count, wire_count, FieldIo};
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reader::ObjectCache;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::writer::ObjectMap;
use crate::objects::{
    chain_ends, walk_chain, EntityChain, ObjectCommon, ObjectId, ObjectKind, TableEntries,
    TableEntryData,
};
use crate::tables::{entry_references, resolve_entries, visit_entry_count, visit_entry_handles};
use crate::types::Vector3;

pub const MODEL_SPACE_NAME: &str = "*MODEL_SPACE";
pub const PAPER_SPACE_NAME: &str = "*PAPER_SPACE";

/// A block header table entry
///
/// Owns the Block and EndBlock markers and the chain of entities between
/// them. The model and paper space are block headers too.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub common: ObjectCommon,
    pub entry: TableEntryData,
    pub anonymous: bool,
    pub has_attributes: bool,
    pub is_xref: bool,
    pub is_overlaid: bool,
    /// R2000
    pub is_loaded: bool,
    pub base_point: Vector3,
    pub xref_path: String,
    pub description: String,
    /// Preview image, R2000
    pub preview: Vec<u8>,

    pub first_entity_handle: HandleReference,
    pub last_entity_handle: HandleReference,
    pub block_entity_handle: HandleReference,
    pub end_block_handle: HandleReference,
    /// Inserts of this block, R2000. Inserts are never written, so saving
    /// clears the list.
    pub insert_handles: Vec<HandleReference>,
    /// R2000; nulled on save, layouts are never written
    pub layout_handle: HandleReference,

    pub block: Option<ObjectId>,
    pub entities: EntityChain,
    pub end_block: Option<ObjectId>,
}

impl BlockHeader {
    pub fn new(name: impl Into<String>) -> Self {
        BlockHeader {
            entry: TableEntryData::new(name),
            ..Default::default()
        }
    }

    pub fn is_model_space(&self) -> bool {
        self.entry.name.eq_ignore_ascii_case(MODEL_SPACE_NAME)
    }

    pub fn is_paper_space(&self) -> bool {
        self.entry.name.eq_ignore_ascii_case(PAPER_SPACE_NAME)
    }

    /// Entity mode given to the entities of this block.
    pub fn entity_mode(&self) -> u8 {
        if self.is_model_space() {
            2
        } else if self.is_paper_space() {
            1
        } else {
            0
        }
    }

    fn is_chained_entity(object_type: DwgObjectType) -> bool {
        object_type.is_entity()
            && !matches!(
                object_type,
                DwgObjectType::Block
                    | DwgObjectType::EndBlock
                    | DwgObjectType::Vertex2D
                    | DwgObjectType::SeqEnd
            )
    }

    fn stores_entity_chain(&self) -> bool {
        !self.is_xref && !self.is_overlaid
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        BlockHeader {
            common: ObjectCommon::default(),
            entry: TableEntryData::default(),
            anonymous: false,
            has_attributes: false,
            is_xref: false,
            is_overlaid: false,
            is_loaded: false,
            base_point: Vector3::ZERO,
            xref_path: String::new(),
            description: String::new(),
            preview: Vec::new(),
            first_entity_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            last_entity_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            block_entity_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            end_block_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            insert_handles: Vec::new(),
            layout_handle: HandleReference::null_of(DwgReferenceType::HardPointer),
            block: None,
            entities: EntityChain::new(),
            end_block: None,
        }
    }
}

impl ObjectKind for BlockHeader {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::BlockHeader;

    table_entry_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let sio = io.sio();
        let handle = self.common.handle;
        self.entry.visit_prefix(io)?;
        io.bit(&mut self.anonymous)?;
        io.bit(&mut self.has_attributes)?;
        io.bit(&mut self.is_xref)?;
        io.bit(&mut self.is_overlaid)?;
        if sio.r2000_plus {
            io.bit(&mut self.is_loaded)?;
        }
        io.point3(&mut self.base_point)?;
        io.text(&mut self.xref_path)?;

        if sio.r2000_plus {
            // One nonzero byte per insert, then a zero
            if io.is_reading() {
                let mut count = 0;
                loop {
                    let mut marker = 0u8;
                    io.raw_char(&mut marker)?;
                    if marker == 0 {
                        break;
                    }
                    count += 1;
                }
                self.insert_handles = vec![HandleReference::NULL; count];
            } else {
                for _ in 0..self.insert_handles.len() {
                    let mut marker = 1u8;
                    io.raw_char(&mut marker)?;
                }
                let mut end = 0u8;
                io.raw_char(&mut end)?;
            }
        }

        io.text(&mut self.description)?;

        if sio.r2000_plus {
            let mut size: i32 = wire_count(self.preview.len(), handle, "preview bytes")?;
            io.bit_long(&mut size)?;
            io.raw_bytes(&mut self.preview, read_count(size as i64, handle, "preview byte")?)?;
        }
        Ok(())
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let sio = io.sio();
        self.entry.visit_xref_block(io)?;
        if self.stores_entity_chain() {
            io.handle(&mut self.first_entity_handle)?;
            io.handle(&mut self.last_entity_handle)?;
        }
        io.handle(&mut self.block_entity_handle)?;
        if sio.r2000_plus {
            for insert in self.insert_handles.iter_mut() {
                io.handle(insert)?;
            }
        }
        io.handle(&mut self.end_block_handle)?;
        if sio.r2000_plus {
            io.handle(&mut self.layout_handle)?;
        }
        Ok(())
    }

    fn after_read(&mut self, id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        let handle = self.common.handle;

        let block = self.block_entity_handle.resolve_next(handle);
        self.block = if block.is_null() {
            None
        } else {
            let block = cache.get_object::<Block>(block, handle)?;
            cache.set_owner(block, id);
            Some(block)
        };

        if self.stores_entity_chain() {
            self.entities = walk_chain(
                cache,
                handle,
                &self.first_entity_handle,
                &self.last_entity_handle,
                Self::is_chained_entity,
            )?;
            for entity in self.entities.iter() {
                cache.set_owner(entity, id);
            }
        }

        let end_block = self.end_block_handle.resolve_next(handle);
        self.end_block = if end_block.is_null() {
            None
        } else {
            let end_block = cache.get_object::<EndBlock>(end_block, handle)?;
            cache.set_owner(end_block, id);
            Some(end_block)
        };
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        let (first, last) = chain_ends(map, &self.entities, DwgReferenceType::SoftPointer)?;
        self.first_entity_handle = first;
        self.last_entity_handle = last;
        self.block_entity_handle = map.reference(DwgReferenceType::SoftPointer, self.block)?;
        self.end_block_handle = map.reference(DwgReferenceType::SoftPointer, self.end_block)?;
        self.insert_handles.clear();
        self.layout_handle = HandleReference::null_of(DwgReferenceType::HardPointer);
        Ok(())
    }

    fn child_ids(&self) -> Vec<ObjectId> {
        self.block
            .into_iter()
            .chain(self.entities.iter())
            .chain(self.end_block)
            .collect()
    }
}

/// Control object of the block table
///
/// `entries` holds every block header, the model and paper space included.
/// On the wire those two are stored apart from the entry handles.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockControl {
    pub common: ObjectCommon,
    pub entries: TableEntries,
    pub entry_handles: Vec<HandleReference>,
    pub entry_count: i16,
    pub model_space_handle: HandleReference,
    pub paper_space_handle: HandleReference,

    pub model_space: Option<ObjectId>,
    pub paper_space: Option<ObjectId>,
    pub(crate) pending: Vec<ObjectId>,
}

impl Default for BlockControl {
    fn default() -> Self {
        BlockControl {
            common: ObjectCommon::default(),
            entries: TableEntries::new(),
            entry_handles: Vec::new(),
            entry_count: 0,
            model_space_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            paper_space_handle: HandleReference::null_of(DwgReferenceType::SoftPointer),
            model_space: None,
            paper_space: None,
            pending: Vec::new(),
        }
    }
}

impl BlockControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_space(
        &self,
        reference: &HandleReference,
        cache: &mut ObjectCache<'_>,
    ) -> Result<Option<ObjectId>> {
        let handle = self.common.handle;
        if reference.code != DwgReferenceType::SoftPointer {
            return Err(DwgError::malformed(handle, "incorrect layout block handle code"));
        }
        let target = reference.resolve_next(handle);
        if target.is_null() {
            return Ok(None);
        }
        Ok(Some(cache.get_object::<BlockHeader>(target, handle)?))
    }
}

impl ObjectKind for BlockControl {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::BlockControl;

    fn common(&self) -> &ObjectCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ObjectCommon {
        &mut self.common
    }

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_entry_count(io, &mut self.entry_count)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        visit_entry_handles(io, &mut self.entry_handles, self.entry_count, self.common.handle)?;
        io.handle(&mut self.model_space_handle)?;
        io.handle(&mut self.paper_space_handle)
    }

    fn pose_parse(&mut self, _id: ObjectId, cache: &mut ObjectCache<'_>) -> Result<()> {
        let blocks = resolve_entries::<BlockHeader>(
            &self.common,
            self.entry_count,
            &self.entry_handles,
            cache,
        )?;
        let model_space_handle = self.model_space_handle;
        let paper_space_handle = self.paper_space_handle;
        self.model_space = self.resolve_space(&model_space_handle, cache)?;
        self.paper_space = self.resolve_space(&paper_space_handle, cache)?;

        self.pending = self
            .model_space
            .into_iter()
            .chain(self.paper_space)
            .chain(blocks)
            .collect();
        Ok(())
    }

    fn pre_write(&mut self, map: &ObjectMap) -> Result<()> {
        let spaces = [self.model_space, self.paper_space];
        self.entry_handles = entry_references(&self.entries, &spaces, map)?;
        self.entry_count = wire_count(self.entry_handles.len(), self.common.handle, "blocks")?;
        self.model_space_handle = map.reference(DwgReferenceType::SoftPointer, self.model_space)?;
        self.paper_space_handle = map.reference(DwgReferenceType::SoftPointer, self.paper_space)?;
        Ok(())
    }

    fn child_ids(&self) -> Vec<ObjectId> {
        self.entries.ids().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    #[test]
    fn test_space_names() {
        let model = BlockHeader::new("*Model_Space");
        assert!(model.is_model_space());
        assert_eq!(model.entity_mode(), 2);
        assert_eq!(BlockHeader::new(PAPER_SPACE_NAME).entity_mode(), 1);
        assert_eq!(BlockHeader::new("DOOR").entity_mode(), 0);
    }

    #[test]
    fn test_children_order() {
        let mut header = BlockHeader::new("DOOR");
        header.block = Some(ObjectId(1));
        header.entities = vec![ObjectId(2), ObjectId(3)].into();
        header.end_block = Some(ObjectId(4));
        assert_eq!(
            header.child_ids(),
            vec![ObjectId(1), ObjectId(2), ObjectId(3), ObjectId(4)]
        );
    }

    #[test]
    fn test_r2000_insert_markers() {
        let mut header = BlockHeader::new("DOOR");
        header.description = "a door".to_string();
        header.preview = vec![1, 2, 3];
        header.insert_handles = vec![HandleReference::NULL; 2];

        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        header.clone().fields(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut parsed = BlockHeader::default();
        parsed
            .fields(&mut DwgStreamReader::new(&bytes, DwgVersion::AC1015))
            .unwrap();
        assert_eq!(parsed.insert_handles.len(), 2);
        assert_eq!(parsed.description, "a door");
        assert_eq!(parsed.preview, vec![1, 2, 3]);
    }

    #[test]
    fn test_r13_has_no_preview() {
        let mut header = BlockHeader::new("DOOR");
        header.base_point = Vector3::new(1.0, 2.0, 0.0);

        let mut writer = DwgStreamWriter::new(DwgVersion::AC1012);
        header.clone().fields(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut parsed = BlockHeader::default();
        parsed
            .fields(&mut DwgStreamReader::new(&bytes, DwgVersion::AC1012))
            .unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_save_drops_insert_and_layout_links() {
        let mut header = BlockHeader::new("DOOR");
        header.insert_handles = vec![HandleReference::new(DwgReferenceType::SoftPointer, 0x2A); 2];
        header.layout_handle = HandleReference::new(DwgReferenceType::HardPointer, 0x1F);

        header.pre_write(&ObjectMap::default()).unwrap();
        assert!(header.insert_handles.is_empty());
        assert!(header.layout_handle.points_to_null(header.common.handle));
        assert_eq!(header.layout_handle.code, DwgReferenceType::HardPointer);
    }

    #[test]
    fn test_control_skips_spaces_in_entry_handles() {
        let control = BlockControl::new();
        assert_eq!(control.model_space_handle.code, DwgReferenceType::SoftPointer);
        assert!(control.child_ids().is_empty());
    }
}
