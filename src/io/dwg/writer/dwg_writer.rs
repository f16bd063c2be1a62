//! DWG file writer: top-level orchestrator.
//!
//! Lays out an R13-R2000 file:
//!
//! ```text
//! file header (0x61 bytes)
//! header variables block
//! classes block
//! object records
//! object map table
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::document::Drawing;
use crate::error::Result;
use crate::io::dwg::code_page::encoding_from_code_page;
use crate::io::dwg::constants::{section_names, FILE_HEADER_SIZE};
use crate::io::dwg::file_header::{DwgFileHeader, DEFAULT_CODE_PAGE};
use crate::types::Handle;

use super::{DwgClassesWriter, DwgHandleWriter, DwgHeaderWriter, DwgObjectWriter, ObjectMap};

/// Configuration options for the DWG writer.
#[derive(Debug, Clone)]
pub struct DwgWriterConfiguration {
    /// Maintenance release byte of the file header
    pub maintenance_version: u8,
    /// Code page index of the file header; also selects the text encoding
    pub code_page: u16,
}

impl Default for DwgWriterConfiguration {
    fn default() -> Self {
        Self {
            maintenance_version: 0,
            code_page: DEFAULT_CODE_PAGE,
        }
    }
}

/// DWG file writer.
///
/// The drawing itself is never modified: handle assignment, chain stitching
/// and reference rebuilding happen on a session copy of its objects.
pub struct DwgWriter<'a> {
    drawing: &'a Drawing,
    config: DwgWriterConfiguration,
}

impl<'a> DwgWriter<'a> {
    pub fn new(drawing: &'a Drawing) -> Self {
        Self {
            drawing,
            config: DwgWriterConfiguration::default(),
        }
    }

    pub fn with_config(mut self, config: DwgWriterConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Encode the drawing as a complete file image.
    pub fn write(&self) -> Result<Vec<u8>> {
        let drawing = self.drawing;
        let version = drawing.version;

        let mut objects = drawing.objects.clone();
        let map = ObjectMap::build(&objects, &drawing.roots(), drawing.header.handle_seed)?;

        let mut object_writer = DwgObjectWriter::new(version);
        object_writer.set_encoding(encoding_from_code_page(self.config.code_page));
        let records = object_writer.write(&mut objects, &map)?;

        let mut header = drawing.header.clone();
        header.handle_seed = map.handle_seed();
        let control = |id| map.handle_of(id).unwrap_or(Handle::NULL);
        header.block_control = control(drawing.block_control);
        header.layer_control = control(drawing.layer_control);
        header.style_control = control(drawing.style_control);
        header.line_type_control = control(drawing.line_type_control);
        header.dim_style_control = control(drawing.dim_style_control);
        // Tables outside the supported set are not written
        header.view_control = Handle::NULL;
        header.ucs_control = Handle::NULL;
        header.vport_control = Handle::NULL;
        header.app_id_control = Handle::NULL;
        header.viewport_entity_header_control = Handle::NULL;

        let header_bytes = DwgHeaderWriter::new(version).write(&header)?;
        let classes_bytes = DwgClassesWriter::new(version).write(&drawing.classes)?;

        let header_start = FILE_HEADER_SIZE;
        let classes_start = header_start + header_bytes.len();
        let objects_start = classes_start + classes_bytes.len();
        let handles_start = objects_start + records.data.len();

        let offsets: BTreeMap<Handle, u64> = records
            .offsets
            .iter()
            .map(|(&handle, &offset)| (handle, offset + objects_start as u64))
            .collect();
        let handles_bytes = DwgHandleWriter::new(version).write(&offsets)?;

        let mut file_header = DwgFileHeader::new(version);
        file_header.maintenance_version = self.config.maintenance_version;
        file_header.code_page = self.config.code_page;
        file_header.set_locator(
            section_names::HEADER,
            file_u32(header_start)?,
            file_u32(header_bytes.len())?,
        );
        file_header.set_locator(
            section_names::CLASSES,
            file_u32(classes_start)?,
            file_u32(classes_bytes.len())?,
        );
        file_header.set_locator(
            section_names::HANDLES,
            file_u32(handles_start)?,
            file_u32(handles_bytes.len())?,
        );

        let mut output = file_header.write()?;
        output.reserve(handles_start + handles_bytes.len() - FILE_HEADER_SIZE);
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&classes_bytes);
        output.extend_from_slice(&records.data);
        output.extend_from_slice(&handles_bytes);

        debug!(
            %version,
            objects = map.len(),
            handle_seed = %header.handle_seed,
            bytes = output.len(),
            "wrote drawing"
        );
        Ok(output)
    }

    /// Encode and write to `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        let bytes = self.write()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Encode and write to a file, replacing it.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut sink = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut sink)
    }
}

/// Offsets and sizes are stored as RL in the file header.
fn file_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("section offset {} does not fit the file header", value),
        )
        .into()
    })
}
