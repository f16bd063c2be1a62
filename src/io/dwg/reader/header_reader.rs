//! Reader for the `AcDb:Header` block.

use crate::error::Result;
use crate::header::HeaderVariables;
use crate::io::dwg::constants::section_names;
use crate::io::dwg::reader::DwgStreamReader;
use crate::io::dwg::section_io::SectionIO;
use crate::notification::Notification;
use crate::types::DwgVersion;

/// Reads the header variables from their checksummed block.
pub struct DwgHeaderReader<'a> {
    bytes: &'a [u8],
    version: DwgVersion,
    failsafe: bool,
}

/// Parsed header block.
#[derive(Debug)]
pub struct HeaderSection {
    pub header: HeaderVariables,
    pub consumed: usize,
    pub warnings: Vec<Notification>,
}

impl<'a> DwgHeaderReader<'a> {
    /// `bytes` must start at the block's start sentinel.
    pub fn new(version: DwgVersion, bytes: &'a [u8], failsafe: bool) -> Self {
        Self {
            bytes,
            version,
            failsafe,
        }
    }

    pub fn read(&self) -> Result<HeaderSection> {
        let section = SectionIO::unframe(section_names::HEADER, self.bytes, self.failsafe)?;

        let mut reader = DwgStreamReader::new(section.data, self.version);
        let mut header = HeaderVariables::default();
        header.visit(&mut reader)?;

        tracing::debug!(
            version = %self.version,
            handle_seed = %header.handle_seed,
            "read header variables"
        );

        Ok(HeaderSection {
            header,
            consumed: section.consumed,
            warnings: section.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DwgError;
    use crate::io::dwg::writer::DwgHeaderWriter;
    use crate::types::Handle;

    #[test]
    fn test_reads_written_block() {
        for version in DwgVersion::ALL {
            let mut header = HeaderVariables::default();
            header.handle_seed = Handle::new(0x40);
            let bytes = DwgHeaderWriter::new(version).write(&header).unwrap();
            let parsed = DwgHeaderReader::new(version, &bytes, false).read().unwrap();
            assert_eq!(parsed.header, header);
            assert_eq!(parsed.consumed, bytes.len());
        }
    }

    #[test]
    fn test_flipped_byte_fails_checksum() {
        let version = DwgVersion::AC1014;
        let mut bytes = DwgHeaderWriter::new(version)
            .write(&HeaderVariables::default())
            .unwrap();
        bytes[40] ^= 0x10;
        let err = DwgHeaderReader::new(version, &bytes, true).read().unwrap_err();
        assert!(matches!(err, DwgError::ChecksumMismatch { ref section, .. } if section == "AcDb:Header"));
    }
}
