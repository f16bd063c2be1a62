//! Writer for the `AcDb:Header` block.

use crate::error::Result;
use crate::header::HeaderVariables;
use crate::io::dwg::constants::section_names;
use crate::io::dwg::section_io::SectionIO;
use crate::io::dwg::writer::DwgStreamWriter;
use crate::types::DwgVersion;

/// Writes the header variables as a checksummed block.
pub struct DwgHeaderWriter {
    version: DwgVersion,
}

impl DwgHeaderWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self { version }
    }

    /// Encode `header` and wrap it with sentinels, size and CRC.
    pub fn write(&self, header: &HeaderVariables) -> Result<Vec<u8>> {
        let mut writer = DwgStreamWriter::new(self.version);
        let mut scratch = header.clone();
        scratch.visit(&mut writer)?;

        SectionIO::frame(section_names::HEADER, &writer.finish())
    }
}
