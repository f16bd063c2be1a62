//! DWG reader orchestrator: the main entry point for reading DWG files.
//!
//! Reads the file header, the header variables, the classes and the object
//! map table, then resolves the table controls through the [`ObjectCache`].
//! Everything else is loaded on demand from there.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dwgcodec::io::dwg::reader::DwgReader;
//!
//! let drawing = DwgReader::from_file("sample.dwg")?.read()?;
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::document::Drawing;
use crate::error::{DwgError, Result};
use crate::io::dwg::code_page::encoding_from_code_page;
use crate::io::dwg::constants::section_names;
use crate::io::dwg::file_header::DwgFileHeader;
use crate::notification::NotificationCollection;
use crate::objects::{ObjectId, ObjectKind};
use crate::tables::{BlockControl, DimStyleControl, LayerControl, LineTypeControl, StyleControl};
use crate::types::Handle;

use super::{DwgClassesReader, DwgHandleReader, DwgHeaderReader, ObjectCache};

/// Configuration options for the DWG reader.
#[derive(Debug, Clone)]
pub struct DwgReaderConfiguration {
    /// When `true`, a section sentinel that does not match is reported as a
    /// notification instead of failing the read.
    ///
    /// Default: `true`.
    pub failsafe_sentinels: bool,
}

impl Default for DwgReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe_sentinels: true,
        }
    }
}

/// DWG file reader: reads an R13-R2000 file and produces a [`Drawing`].
///
/// # Architecture
///
/// The read pipeline is:
///
/// 1. Read the file header and its section locators.
/// 2. Read the header variables block (checksum verified).
/// 3. Read the classes block.
/// 4. Read the object map table (handle → file offset).
/// 5. Resolve the five supported table controls; each pulls in the objects
///    it references.
///
/// A failure at any step discards everything read so far.
pub struct DwgReader {
    data: Vec<u8>,
    config: DwgReaderConfiguration,
}

impl DwgReader {
    /// Read from an in-memory file image.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            config: DwgReaderConfiguration::default(),
        }
    }

    /// Read everything from `reader` first.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// Open a DWG file by path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Set configuration options.
    pub fn with_config(mut self, config: DwgReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the whole drawing.
    pub fn read(&self) -> Result<Drawing> {
        let failsafe = self.config.failsafe_sentinels;
        let mut notifications = NotificationCollection::new();

        let (file_header, warning) = DwgFileHeader::read(&self.data, failsafe)?;
        notifications.extend_from(warning);
        let version = file_header.version;

        let header = DwgHeaderReader::new(
            version,
            self.section(&file_header, section_names::HEADER)?,
            failsafe,
        )
        .read()?;
        notifications.extend_from(header.warnings);

        let classes = DwgClassesReader::new(
            version,
            self.section(&file_header, section_names::CLASSES)?,
            failsafe,
        )
        .read()?;
        notifications.extend_from(classes.warnings);

        let offsets =
            DwgHandleReader::new(version, self.section(&file_header, section_names::HANDLES)?)
                .read()?;

        let variables = header.header;
        let mut cache = ObjectCache::new(&self.data, version, &offsets);
        cache.set_encoding(encoding_from_code_page(file_header.code_page));

        let block_control = root::<BlockControl>(&mut cache, variables.block_control, "block")?;
        let layer_control = root::<LayerControl>(&mut cache, variables.layer_control, "layer")?;
        let style_control = root::<StyleControl>(&mut cache, variables.style_control, "style")?;
        let line_type_control =
            root::<LineTypeControl>(&mut cache, variables.line_type_control, "linetype")?;
        let dim_style_control =
            root::<DimStyleControl>(&mut cache, variables.dim_style_control, "dimstyle")?;

        let resolved = cache.len();
        let objects = cache.finish()?;
        debug!(
            %version,
            mapped = offsets.len(),
            resolved,
            notifications = notifications.len(),
            "read drawing"
        );

        Ok(Drawing {
            version,
            maintenance_version: file_header.maintenance_version,
            code_page: file_header.code_page,
            header: variables,
            classes: classes.classes,
            objects,
            block_control,
            layer_control,
            style_control,
            line_type_control,
            dim_style_control,
            notifications,
        })
    }

    fn section(&self, file_header: &DwgFileHeader, name: &str) -> Result<&[u8]> {
        let locator = file_header.require_locator(name)?;
        self.data.get(locator.range()).ok_or_else(|| {
            DwgError::corrupt(
                u64::from(locator.seeker) * 8,
                format!("{} runs past the end of the file", name),
            )
        })
    }
}

/// Resolve the control a header handle points at.
fn root<T: ObjectKind>(cache: &mut ObjectCache<'_>, handle: Handle, table: &str) -> Result<ObjectId> {
    if handle.is_null() {
        return Err(DwgError::malformed(
            Handle::NULL,
            format!("header has no {} control", table),
        ));
    }
    cache.get_object::<T>(handle, Handle::NULL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::constants::FILE_HEADER_SIZE;
    use crate::types::DwgVersion;

    #[test]
    fn test_default_config_is_lenient() {
        assert!(DwgReaderConfiguration::default().failsafe_sentinels);
    }

    #[test]
    fn test_truncated_file() {
        let err = DwgReader::from_bytes(vec![0u8; 10]).read().unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }));
    }

    #[test]
    fn test_section_past_end() {
        let mut header = DwgFileHeader::new(DwgVersion::AC1015);
        header.set_locator(section_names::HEADER, FILE_HEADER_SIZE as u32, 0x1000);
        let bytes = header.write().unwrap();
        let err = DwgReader::from_bytes(bytes).read().unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }));
    }
}
