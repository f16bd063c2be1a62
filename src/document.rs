//! The drawing: header variables, classes and the object graph

use std::io::Write;
use std::path::Path;

use crate::classes::DwgClassCollection;
use crate::entities::{Block, EndBlock, Polyline2D, SeqEnd, Vertex2D};
use crate::error::{DwgError, Result};
use crate::header::HeaderVariables;
use crate::io::dwg::file_header::DEFAULT_CODE_PAGE;
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::{DwgReader, DwgReaderConfiguration, DwgWriter, DwgWriterConfiguration};
use crate::notification::NotificationCollection;
use crate::objects::{DwgObject, ObjectArena, ObjectId, ObjectKind, ObjectVariant};
use crate::tables::block_record::{MODEL_SPACE_NAME, PAPER_SPACE_NAME};
use crate::tables::{
    BlockControl, BlockHeader, DimStyle, DimStyleControl, Layer, LayerControl, LineType,
    LineTypeControl, Style, StyleControl, TableEntry,
};
use crate::types::{DwgVersion, Handle};

/// An R13-R2000 drawing
///
/// Objects live in [`Drawing::objects`]; the five table controls are the
/// roots everything written is reached from.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub version: DwgVersion,
    /// Maintenance release byte of the file header
    pub maintenance_version: u8,
    /// Code page index of the file header
    pub code_page: u16,
    pub header: HeaderVariables,
    pub classes: DwgClassCollection,
    pub objects: ObjectArena,

    pub block_control: ObjectId,
    pub layer_control: ObjectId,
    pub style_control: ObjectId,
    pub line_type_control: ObjectId,
    pub dim_style_control: ObjectId,

    /// Notifications collected during the last read
    pub notifications: NotificationCollection,
}

impl Drawing {
    /// Create a minimal drawing: layer "0", the BYLAYER, BYBLOCK and
    /// CONTINUOUS linetypes, the STANDARD text and dimension styles, and the
    /// model and paper space blocks.
    pub fn new(version: DwgVersion) -> Self {
        let mut objects = ObjectArena::new();
        let block_control = objects.push(BlockControl::new());
        let layer_control = objects.push(LayerControl::new());
        let style_control = objects.push(StyleControl::new());
        let line_type_control = objects.push(LineTypeControl::new());
        let dim_style_control = objects.push(DimStyleControl::new());

        let mut drawing = Drawing {
            version,
            maintenance_version: 0,
            code_page: DEFAULT_CODE_PAGE,
            header: HeaderVariables::default(),
            classes: DwgClassCollection::new(),
            objects,
            block_control,
            layer_control,
            style_control,
            line_type_control,
            dim_style_control,
            notifications: NotificationCollection::new(),
        };
        drawing.initialize_defaults();
        drawing
    }

    /// Initialize default tables with standard entries
    fn initialize_defaults(&mut self) {
        // Names are unique in an empty drawing, so the adds cannot fail
        let _ = self.add_table_entry(LineType::by_layer());
        let _ = self.add_table_entry(LineType::by_block());
        let continuous = self.add_table_entry(LineType::continuous()).ok();

        let mut layer_zero = Layer::new("0");
        layer_zero.line_type = continuous;
        let _ = self.add_table_entry(layer_zero);

        if let Ok(standard) = self.add_table_entry(Style::standard()) {
            let _ = self.add_table_entry(DimStyle::standard(standard));
        }

        let model_space = self.add_block(MODEL_SPACE_NAME).ok();
        let paper_space = self.add_block(PAPER_SPACE_NAME).ok();
        if let Some(control) = self.get_mut::<BlockControl>(self.block_control) {
            control.model_space = model_space;
            control.paper_space = paper_space;
        }
    }

    /// Open a drawing from an in-memory file image.
    pub fn open(bytes: &[u8]) -> Result<Drawing> {
        Self::open_with(bytes, DwgReaderConfiguration::default())
    }

    pub fn open_with(bytes: &[u8], config: DwgReaderConfiguration) -> Result<Drawing> {
        DwgReader::from_bytes(bytes).with_config(config).read()
    }

    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Drawing> {
        DwgReader::from_file(path)?.read()
    }

    /// Encode the drawing to `sink`.
    pub fn save<W: Write>(&self, sink: &mut W) -> Result<()> {
        self.save_with(sink, self.writer_configuration())
    }

    pub fn save_with<W: Write>(&self, sink: &mut W, config: DwgWriterConfiguration) -> Result<()> {
        DwgWriter::new(self).with_config(config).write_to(sink)
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        DwgWriter::new(self)
            .with_config(self.writer_configuration())
            .write_to_file(path)
    }

    /// Encode the drawing as a file image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        DwgWriter::new(self)
            .with_config(self.writer_configuration())
            .write()
    }

    fn writer_configuration(&self) -> DwgWriterConfiguration {
        DwgWriterConfiguration {
            maintenance_version: self.maintenance_version,
            code_page: self.code_page,
        }
    }

    /// The table controls, in the order they are written.
    pub fn roots(&self) -> [ObjectId; 5] {
        [
            self.block_control,
            self.layer_control,
            self.style_control,
            self.line_type_control,
            self.dim_style_control,
        ]
    }

    pub fn get<T: ObjectKind>(&self, id: ObjectId) -> Option<&T> {
        self.objects.get_as::<T>(id)
    }

    pub fn get_mut<T: ObjectKind>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_as_mut::<T>(id)
    }

    /// Add an object that something else will own.
    pub fn add_object(&mut self, object: impl Into<DwgObject>) -> ObjectId {
        self.objects.push(object)
    }

    fn control_of(&self, control_type: DwgObjectType) -> Result<ObjectId> {
        self.roots()
            .into_iter()
            .find(|&id| self.objects.get(id).map(DwgObject::object_type) == Some(control_type))
            .ok_or_else(|| DwgError::malformed(Handle::NULL, format!("drawing has no {}", control_type)))
    }

    /// Add a named entry to the table of its type.
    pub fn add_table_entry<E: TableEntry>(&mut self, entry: E) -> Result<ObjectId> {
        let control = self.control_of(E::CONTROL_TYPE)?;
        let name = entry.table_entry().map(|e| e.name.clone()).unwrap_or_default();
        let control_handle = self.objects.get(control).map(DwgObject::handle).unwrap_or_default();
        if self.entry_by_name(control, &name).is_some() {
            return Err(DwgError::malformed(
                control_handle,
                format!("duplicate table entry '{}'", name),
            ));
        }

        let id = self.objects.push(entry.into_object());
        if let Some(entries) = self.objects.get_mut(control).and_then(DwgObject::table_entries_mut) {
            entries.add(&name, id, control_handle)?;
        }
        self.set_owner(id, control);
        Ok(id)
    }

    /// Entry `name` of the table held by `control`.
    pub fn entry_by_name(&self, control: ObjectId, name: &str) -> Option<ObjectId> {
        self.objects
            .get(control)
            .and_then(DwgObject::table_entries)
            .and_then(|entries| entries.get(name))
    }

    pub fn layer_by_name(&self, name: &str) -> Option<ObjectId> {
        self.entry_by_name(self.layer_control, name)
    }

    pub fn line_type_by_name(&self, name: &str) -> Option<ObjectId> {
        self.entry_by_name(self.line_type_control, name)
    }

    pub fn style_by_name(&self, name: &str) -> Option<ObjectId> {
        self.entry_by_name(self.style_control, name)
    }

    pub fn dim_style_by_name(&self, name: &str) -> Option<ObjectId> {
        self.entry_by_name(self.dim_style_control, name)
    }

    pub fn block_by_name(&self, name: &str) -> Option<ObjectId> {
        self.entry_by_name(self.block_control, name)
    }

    /// Create a block header with its Block and EndBlock markers.
    pub fn add_block(&mut self, name: &str) -> Result<ObjectId> {
        let layer = self.layer_by_name("0");
        let mut block = Block::new(name);
        block.entity.layer = layer;
        let mut end_block = EndBlock::new();
        end_block.entity.layer = layer;

        let mut header = BlockHeader::new(name);
        header.block = Some(self.objects.push(block));
        header.end_block = Some(self.objects.push(end_block));
        let id = self.add_table_entry(header)?;

        let markers = self
            .get::<BlockHeader>(id)
            .map(|h| [h.block, h.end_block])
            .unwrap_or_default();
        for marker in markers.into_iter().flatten() {
            self.set_owner(marker, id);
        }
        Ok(id)
    }

    pub fn model_space(&self) -> Option<ObjectId> {
        self.get::<BlockControl>(self.block_control)
            .and_then(|c| c.model_space)
    }

    pub fn paper_space(&self) -> Option<ObjectId> {
        self.get::<BlockControl>(self.block_control)
            .and_then(|c| c.paper_space)
    }

    /// Append an entity to a block's entity chain. Entities without a layer
    /// are put on layer "0".
    pub fn add_entity_to_block(&mut self, block: ObjectId, entity: impl Into<DwgObject>) -> Result<ObjectId> {
        let mut object = entity.into();
        let handle = object.handle();
        if !object.object_type().is_entity() {
            return Err(DwgError::malformed(handle, format!("{} is not an entity", object.object_type())));
        }
        if self.get::<BlockHeader>(block).is_none() {
            return Err(DwgError::malformed(handle, format!("{} is not a block header", block)));
        }

        let layer_zero = self.layer_by_name("0");
        if let Some(entity) = object.entity_mut() {
            if entity.layer.is_none() {
                entity.layer = layer_zero;
            }
            entity.common.owner = Some(block);
        }
        let id = self.objects.push(object);
        if let Some(header) = self.get_mut::<BlockHeader>(block) {
            header.entities.push(id);
        }
        Ok(id)
    }

    pub fn add_entity_to_model_space(&mut self, entity: impl Into<DwgObject>) -> Result<ObjectId> {
        let model_space = self
            .model_space()
            .ok_or_else(|| DwgError::malformed(Handle::NULL, "drawing has no model space"))?;
        self.add_entity_to_block(model_space, entity)
    }

    /// Add a 2D polyline with its vertices and closing seqend to model space.
    pub fn add_polyline_2d(&mut self, mut polyline: Polyline2D, vertices: Vec<Vertex2D>) -> Result<ObjectId> {
        if polyline.entity.layer.is_none() {
            polyline.entity.layer = self.layer_by_name("0");
        }
        let layer = polyline.entity.layer;

        for mut vertex in vertices {
            vertex.entity.layer = layer;
            polyline.vertices.push(self.objects.push(vertex));
        }
        let mut seq_end = SeqEnd::new();
        seq_end.entity.layer = layer;
        polyline.seq_end = Some(self.objects.push(seq_end));

        let children: Vec<ObjectId> = polyline.child_ids();
        let id = self.add_entity_to_model_space(polyline)?;
        for child in children {
            self.set_owner(child, id);
        }
        Ok(id)
    }

    /// Take an entity out of a block's chain. The object stays in the arena
    /// but is no longer written.
    pub fn remove_entity(&mut self, block: ObjectId, entity: ObjectId) -> bool {
        self.get_mut::<BlockHeader>(block)
            .is_some_and(|header| header.entities.remove(entity))
    }

    /// Entities of a block, in chain order.
    pub fn block_entities(&self, block: ObjectId) -> Vec<ObjectId> {
        self.get::<BlockHeader>(block)
            .map(|h| h.entities.iter().collect())
            .unwrap_or_default()
    }

    fn set_owner(&mut self, id: ObjectId, owner: ObjectId) {
        if let Some(object) = self.objects.get_mut(id) {
            object.common_mut().owner = Some(owner);
        }
    }
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new(DwgVersion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Line;
    use crate::types::Vector3;

    #[test]
    fn test_new_drawing_tables() {
        let drawing = Drawing::new(DwgVersion::AC1015);
        for name in ["BYLAYER", "BYBLOCK", "CONTINUOUS"] {
            assert!(drawing.line_type_by_name(name).is_some(), "{}", name);
        }
        let layer = drawing.layer_by_name("0").unwrap();
        assert_eq!(
            drawing.get::<Layer>(layer).unwrap().line_type,
            drawing.line_type_by_name("CONTINUOUS")
        );
        assert_eq!(drawing.get::<Layer>(layer).unwrap().common.owner, Some(drawing.layer_control));

        let style = drawing.style_by_name("STANDARD").unwrap();
        let dim_style = drawing.dim_style_by_name("standard").unwrap();
        assert_eq!(drawing.get::<DimStyle>(dim_style).unwrap().text_style, Some(style));

        let model_space = drawing.model_space().unwrap();
        assert_eq!(drawing.block_by_name(MODEL_SPACE_NAME), Some(model_space));
        let header = drawing.get::<BlockHeader>(model_space).unwrap();
        assert!(header.block.is_some() && header.end_block.is_some());
        assert!(drawing.paper_space().is_some());
    }

    #[test]
    fn test_add_table_entry_joins_its_table() {
        let mut drawing = Drawing::new(DwgVersion::AC1015);
        let walls = drawing.add_table_entry(Layer::new("WALLS")).unwrap();
        assert_eq!(drawing.layer_by_name("walls"), Some(walls));
        assert_eq!(drawing.get::<Layer>(walls).unwrap().common.owner, Some(drawing.layer_control));
        assert!(drawing.style_by_name("WALLS").is_none());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut drawing = Drawing::new(DwgVersion::AC1014);
        let before = drawing.objects.len();
        let err = drawing.add_table_entry(Layer::new("0")).unwrap_err();
        assert!(matches!(err, DwgError::MalformedDocument { .. }));
        assert_eq!(drawing.objects.len(), before);
    }

    #[test]
    fn test_entities_default_to_layer_zero() {
        let mut drawing = Drawing::new(DwgVersion::AC1015);
        let line = drawing
            .add_entity_to_model_space(Line::from_points(Vector3::ZERO, Vector3::new(1.0, 1.0, 0.0)))
            .unwrap();
        assert_eq!(drawing.get::<Line>(line).unwrap().entity.layer, drawing.layer_by_name("0"));
        assert_eq!(drawing.block_entities(drawing.model_space().unwrap()), vec![line]);
        assert!(drawing.remove_entity(drawing.model_space().unwrap(), line));
        assert!(drawing.block_entities(drawing.model_space().unwrap()).is_empty());
    }

    #[test]
    fn test_non_entity_rejected() {
        let mut drawing = Drawing::new(DwgVersion::AC1015);
        assert!(drawing.add_entity_to_model_space(Layer::new("X")).is_err());
    }
}
