//! Reader for the `AcDb:Classes` block.

use crate::classes::{DwgClass, DwgClassCollection};
use crate::error::Result;
use crate::io::dwg::constants::section_names;
use crate::io::dwg::reader::DwgStreamReader;
use crate::io::dwg::section_io::SectionIO;
use crate::notification::{Notification, NotificationType};
use crate::types::DwgVersion;

/// Reads class records until the block's data is exhausted.
pub struct DwgClassesReader<'a> {
    bytes: &'a [u8],
    version: DwgVersion,
    failsafe: bool,
}

#[derive(Debug)]
pub struct ClassesSection {
    pub classes: DwgClassCollection,
    pub consumed: usize,
    pub warnings: Vec<Notification>,
}

impl<'a> DwgClassesReader<'a> {
    pub fn new(version: DwgVersion, bytes: &'a [u8], failsafe: bool) -> Self {
        Self {
            bytes,
            version,
            failsafe,
        }
    }

    pub fn read(&self) -> Result<ClassesSection> {
        let section = SectionIO::unframe(section_names::CLASSES, self.bytes, self.failsafe)?;

        let mut classes = DwgClassCollection::new();
        let mut warnings = section.warnings;
        let mut reader = DwgStreamReader::new(section.data, self.version);
        while reader.position() < section.data.len() {
            let mut class = DwgClass::default();
            class.visit(&mut reader)?;
            tracing::debug!(
                number = class.class_number,
                dxf_name = %class.dxf_name,
                "read class"
            );
            // Class records only describe custom types, none of which are decoded
            warnings.push(Notification::new(
                NotificationType::NotSupported,
                format!("class {} ({}) is kept but not decoded", class.dxf_name, class.class_number),
            ));
            classes.add_or_update(class);
        }

        Ok(ClassesSection {
            classes,
            consumed: section.consumed,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::writer::DwgClassesWriter;

    #[test]
    fn test_empty_block() {
        let bytes = DwgClassesWriter::new(DwgVersion::AC1015)
            .write(&DwgClassCollection::new())
            .unwrap();
        let parsed = DwgClassesReader::new(DwgVersion::AC1015, &bytes, false)
            .read()
            .unwrap();
        assert!(parsed.classes.is_empty());
        assert_eq!(parsed.consumed, bytes.len());
    }

    #[test]
    fn test_records_in_order() {
        let mut classes = DwgClassCollection::new();
        classes.add_or_update(DwgClass::new(500, "ACDBDICTIONARYWDFLT", "AcDbDictionaryWithDefault"));
        let mut entity = DwgClass::new(501, "WIPEOUT", "AcDbWipeout");
        entity.item_class_id = 0x1F2;
        entity.proxy_flags = 127;
        classes.add_or_update(entity);

        for version in DwgVersion::ALL {
            let bytes = DwgClassesWriter::new(version).write(&classes).unwrap();
            let parsed = DwgClassesReader::new(version, &bytes, false).read().unwrap();
            assert_eq!(parsed.classes, classes);
            assert_eq!(parsed.warnings.len(), 2);
            assert!(parsed.classes.get("WIPEOUT").unwrap().is_entity());
        }
    }
}
