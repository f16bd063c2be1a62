//! Section names, locator numbers and sentinels of the R13-R2000 container.

/// Section names used in logs and error messages.
pub mod section_names {
    /// All entities, table entries, and objects
    pub const ACDB_OBJECTS: &str = "AcDb:AcDbObjects";
    /// System variables (header variables)
    pub const HEADER: &str = "AcDb:Header";
    /// DXF class definitions
    pub const CLASSES: &str = "AcDb:Classes";
    /// Object map (handle to file offset)
    pub const HANDLES: &str = "AcDb:Handles";
    /// The fixed-size block at the start of the file
    pub const FILE_HEADER: &str = "FileHeader";

    /// Locator record number of a section in the file header.
    pub fn locator_number(name: &str) -> Option<u8> {
        match name {
            HEADER => Some(0),
            CLASSES => Some(1),
            HANDLES => Some(2),
            _ => None,
        }
    }
}

/// Sentinel bytes for section boundaries (16-byte markers).
pub mod sentinels {
    /// AcDb:Header section start sentinel
    pub const HEADER_START: [u8; 16] = [
        0xCF, 0x7B, 0x1F, 0x23, 0xFD, 0xDE, 0x38, 0xA9, 0x5F, 0x7C, 0x68, 0xB8, 0x4E, 0x6D,
        0x33, 0x5F,
    ];
    /// AcDb:Header section end sentinel
    pub const HEADER_END: [u8; 16] = [
        0x30, 0x84, 0xE0, 0xDC, 0x02, 0x21, 0xC7, 0x56, 0xA0, 0x83, 0x97, 0x47, 0xB1, 0x92,
        0xCC, 0xA0,
    ];
    /// AcDb:Classes section start sentinel
    pub const CLASSES_START: [u8; 16] = [
        0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF,
        0xB6, 0x8A,
    ];
    /// AcDb:Classes section end sentinel
    pub const CLASSES_END: [u8; 16] = [
        0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30,
        0x49, 0x75,
    ];
    /// File header end sentinel
    pub const FILE_HEADER_END: [u8; 16] = [
        0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A,
        0x4D, 0x00,
    ];

    /// Start and end sentinels framing a checksummed section.
    pub fn for_section(section_name: &str) -> Option<(&'static [u8; 16], &'static [u8; 16])> {
        match section_name {
            super::section_names::HEADER => Some((&HEADER_START, &HEADER_END)),
            super::section_names::CLASSES => Some((&CLASSES_START, &CLASSES_END)),
            _ => None,
        }
    }
}

/// Size of the file header, including its CRC and end sentinel.
pub const FILE_HEADER_SIZE: usize = 0x61;

/// Maximum payload of one object-map chunk.
pub const HANDLE_SECTION_CHUNK_LIMIT: usize = 2032;

/// `item_class_id` of classes whose instances are entities.
pub const CLASS_ID_ENTITY: i16 = 0x1F2;

/// Size of the linetype text area.
pub const LINETYPE_TEXT_AREA_R13: usize = 256;
pub const LINETYPE_TEXT_AREA_R2000: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_numbers() {
        assert_eq!(section_names::locator_number(section_names::HEADER), Some(0));
        assert_eq!(section_names::locator_number(section_names::CLASSES), Some(1));
        assert_eq!(section_names::locator_number(section_names::HANDLES), Some(2));
        assert_eq!(section_names::locator_number(section_names::ACDB_OBJECTS), None);
    }

    #[test]
    fn test_sentinels_are_complements() {
        for (start, end) in [
            (sentinels::HEADER_START, sentinels::HEADER_END),
            (sentinels::CLASSES_START, sentinels::CLASSES_END),
        ] {
            for (a, b) in start.iter().zip(end.iter()) {
                assert_eq!(*a, !*b);
            }
        }
    }
}
