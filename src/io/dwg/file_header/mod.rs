//! The fixed 0x61-byte file header of R13-R2000 drawings.
//!
//! ```text
//! 0x00  6   version string "AC1012" / "AC1014" / "AC1015"
//! 0x06  5   zeros
//! 0x0B  1   maintenance version
//! 0x0C  1   0x01
//! 0x0D  4   preview address
//! 0x11  2   application version bytes
//! 0x13  2   code page
//! 0x15  4   number of locator records
//! 0x19  9n  locator records
//!       ..  zero padding
//! 0x4F  2   CRC of the preceding bytes
//! 0x51  16  end sentinel
//! ```

mod section_locator;

pub use section_locator::DwgSectionLocatorRecord;

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::{section_names, sentinels, FILE_HEADER_SIZE};
use crate::io::dwg::crc;
use crate::io::dwg::section_io::SectionIO;
use crate::notification::Notification;
use crate::types::DwgVersion;

/// Code page 30 (ANSI 1252).
pub const DEFAULT_CODE_PAGE: u16 = 30;

const CRC_OFFSET: usize = FILE_HEADER_SIZE - 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DwgFileHeader {
    pub version: DwgVersion,
    pub maintenance_version: u8,
    /// -1 when the drawing has no preview image
    pub preview_address: i32,
    pub app_version: [u8; 2],
    pub code_page: u16,
    pub records: Vec<DwgSectionLocatorRecord>,
}

impl DwgFileHeader {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            version,
            maintenance_version: 0,
            preview_address: -1,
            app_version: [0x1B, 0x19],
            code_page: DEFAULT_CODE_PAGE,
            records: Vec::new(),
        }
    }

    /// Locator of the section with the given name.
    pub fn locator(&self, section_name: &str) -> Option<&DwgSectionLocatorRecord> {
        let number = section_names::locator_number(section_name)?;
        self.records.iter().find(|r| r.number == number)
    }

    /// Like [`DwgFileHeader::locator`], failing when the record is absent.
    pub fn require_locator(&self, section_name: &str) -> Result<DwgSectionLocatorRecord> {
        self.locator(section_name).copied().ok_or_else(|| {
            DwgError::corrupt(0, format!("file header has no locator for {}", section_name))
        })
    }

    pub fn set_locator(&mut self, section_name: &str, seeker: u32, size: u32) {
        let Some(number) = section_names::locator_number(section_name) else {
            return;
        };
        match self.records.iter_mut().find(|r| r.number == number) {
            Some(record) => {
                record.seeker = seeker;
                record.size = size;
            }
            None => {
                self.records
                    .push(DwgSectionLocatorRecord::new(number, seeker, size));
                self.records.sort_by_key(|r| r.number);
            }
        }
    }

    /// Parse the header at the start of `bytes`.
    pub fn read(bytes: &[u8], failsafe: bool) -> Result<(Self, Option<Notification>)> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(DwgError::corrupt(
                (bytes.len() * 8) as u64,
                "file shorter than its header",
            ));
        }

        let mut cursor = Cursor::new(bytes);
        let mut tag = [0u8; 6];
        cursor.read_exact(&mut tag)?;
        let version: DwgVersion = String::from_utf8_lossy(&tag).parse()?;

        let mut zeros = [0u8; 5];
        cursor.read_exact(&mut zeros)?;
        let maintenance_version = cursor.read_u8()?;
        let _one = cursor.read_u8()?;
        let preview_address = cursor.read_i32::<LittleEndian>()?;
        let mut app_version = [0u8; 2];
        cursor.read_exact(&mut app_version)?;
        let code_page = cursor.read_u16::<LittleEndian>()?;

        let count = cursor.read_i32::<LittleEndian>()?;
        let max_records = (CRC_OFFSET - 0x19) / DwgSectionLocatorRecord::SIZE;
        let count = usize::try_from(count)
            .ok()
            .filter(|c| *c <= max_records)
            .ok_or_else(|| DwgError::corrupt(0x15 * 8, format!("locator count {}", count)))?;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let number = cursor.read_u8()?;
            let seeker = cursor.read_u32::<LittleEndian>()?;
            let size = cursor.read_u32::<LittleEndian>()?;
            records.push(DwgSectionLocatorRecord::new(number, seeker, size));
        }

        cursor.set_position(CRC_OFFSET as u64);
        let stored = cursor.read_u16::<LittleEndian>()?;
        let computed = crc::checksum(&bytes[..CRC_OFFSET]);
        if stored != computed {
            return Err(DwgError::ChecksumMismatch {
                section: section_names::FILE_HEADER.to_string(),
                expected: stored,
                actual: computed,
            });
        }

        let mut sentinel = [0u8; 16];
        cursor.read_exact(&mut sentinel)?;
        let warning = SectionIO::check_sentinel(
            &sentinel,
            &sentinels::FILE_HEADER_END,
            section_names::FILE_HEADER,
            failsafe,
        )?;

        tracing::debug!(%version, maintenance_version, records = records.len(), "read file header");

        Ok((
            Self {
                version,
                maintenance_version,
                preview_address,
                app_version,
                code_page,
                records,
            },
            warning,
        ))
    }

    /// Encode the header as exactly [`FILE_HEADER_SIZE`] bytes.
    pub fn write(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(FILE_HEADER_SIZE);
        buf.extend_from_slice(self.version.as_str().as_bytes());
        buf.extend_from_slice(&[0u8; 5]);
        buf.push(self.maintenance_version);
        buf.push(1);
        buf.write_i32::<LittleEndian>(self.preview_address)?;
        buf.extend_from_slice(&self.app_version);
        buf.write_u16::<LittleEndian>(self.code_page)?;
        buf.write_i32::<LittleEndian>(self.records.len() as i32)?;
        for record in &self.records {
            buf.push(record.number);
            buf.write_u32::<LittleEndian>(record.seeker)?;
            buf.write_u32::<LittleEndian>(record.size)?;
        }

        buf.resize(CRC_OFFSET, 0);
        let crc = crc::checksum(&buf);
        buf.write_u16::<LittleEndian>(crc)?;
        buf.extend_from_slice(&sentinels::FILE_HEADER_END);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DwgFileHeader {
        let mut header = DwgFileHeader::new(DwgVersion::AC1014);
        header.set_locator(section_names::CLASSES, 0x200, 0x40);
        header.set_locator(section_names::HEADER, 0x61, 0x19F);
        header.set_locator(section_names::HANDLES, 0x900, 0x20);
        header
    }

    #[test]
    fn test_fixed_size() {
        let bytes = sample().write().unwrap();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE);
        assert_eq!(&bytes[..6], b"AC1014");
        assert_eq!(bytes[0x0C], 1);
        assert_eq!(&bytes[0x11..0x13], &[0x1B, 0x19]);
    }

    #[test]
    fn test_locators_sorted_and_read_back() {
        let header = sample();
        assert_eq!(
            header.records.iter().map(|r| r.number).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        let (parsed, warning) = DwgFileHeader::read(&header.write().unwrap(), false).unwrap();
        assert!(warning.is_none());
        assert_eq!(parsed, header);
        assert_eq!(parsed.locator(section_names::HANDLES).unwrap().seeker, 0x900);
    }

    #[test]
    fn test_unknown_version_tag() {
        let mut bytes = sample().write().unwrap();
        bytes[5] = b'8';
        let err = DwgFileHeader::read(&bytes, true).unwrap_err();
        assert!(matches!(err, DwgError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_checksum_verified() {
        let mut bytes = sample().write().unwrap();
        bytes[0x1A] ^= 0xFF;
        let err = DwgFileHeader::read(&bytes, true).unwrap_err();
        assert!(matches!(err, DwgError::ChecksumMismatch { .. }));
    }
}
