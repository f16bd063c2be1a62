//! Writer for the `AcDb:Classes` block.

use crate::classes::DwgClassCollection;
use crate::error::Result;
use crate::io::dwg::constants::section_names;
use crate::io::dwg::section_io::SectionIO;
use crate::io::dwg::writer::DwgStreamWriter;
use crate::types::DwgVersion;

pub struct DwgClassesWriter {
    version: DwgVersion,
}

impl DwgClassesWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self { version }
    }

    /// Encode every class in order and frame the result.
    pub fn write(&self, classes: &DwgClassCollection) -> Result<Vec<u8>> {
        let mut writer = DwgStreamWriter::new(self.version);
        for class in classes.iter() {
            class.clone().visit(&mut writer)?;
        }
        SectionIO::frame(section_names::CLASSES, &writer.finish())
    }
}
