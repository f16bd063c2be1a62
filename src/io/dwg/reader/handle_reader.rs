//! Reader for the object map table.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::section_names;
use crate::io::dwg::crc;
use crate::io::dwg::reader::DwgStreamReader;
use crate::types::{DwgVersion, Handle};

pub struct DwgHandleReader<'a> {
    bytes: &'a [u8],
    version: DwgVersion,
}

impl<'a> DwgHandleReader<'a> {
    /// `bytes` must start at the first chunk.
    pub fn new(version: DwgVersion, bytes: &'a [u8]) -> Self {
        Self { bytes, version }
    }

    /// Handle to absolute file offset, for every entry up to the terminating chunk.
    pub fn read(&self) -> Result<BTreeMap<Handle, u64>> {
        let mut map = BTreeMap::new();
        let mut pos = 0usize;

        loop {
            let header = self.slice(pos, 2)?;
            let size = BigEndian::read_u16(header) as usize;
            if size < 2 {
                return Err(DwgError::corrupt(
                    (pos * 8) as u64,
                    format!("object map chunk size {}", size),
                ));
            }

            let chunk = self.slice(pos, size)?;
            let stored = BigEndian::read_u16(self.slice(pos + size, 2)?);
            let computed = crc::checksum(chunk);
            if stored != computed {
                return Err(DwgError::ChecksumMismatch {
                    section: section_names::HANDLES.to_string(),
                    expected: stored,
                    actual: computed,
                });
            }

            if size == 2 {
                break;
            }

            let payload = &chunk[2..];
            let mut reader = DwgStreamReader::new(payload, self.version);
            let mut handle = 0u64;
            let mut offset = 0i64;
            while reader.position() < payload.len() {
                let handle_delta = reader.read_modular_char()?;
                let offset_delta = reader.read_signed_modular_char()?;
                handle = handle.checked_add(handle_delta).ok_or_else(|| {
                    DwgError::corrupt(reader.position_in_bits(), "object map handle overflows")
                })?;
                offset = offset.checked_add(offset_delta).ok_or_else(|| {
                    DwgError::corrupt(reader.position_in_bits(), "object map offset overflows")
                })?;
                let absolute = u64::try_from(offset).map_err(|_| {
                    DwgError::corrupt(
                        reader.position_in_bits(),
                        format!("negative object offset {}", offset),
                    )
                })?;
                map.insert(Handle::new(handle), absolute);
            }

            pos += size + 2;
        }

        tracing::debug!(entries = map.len(), "read object map");
        Ok(map)
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        self.bytes.get(start..start + len).ok_or_else(|| {
            DwgError::corrupt(
                (start * 8) as u64,
                format!("object map truncated at byte {}", start),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::writer::{DwgHandleWriter, DwgStreamWriter};

    fn sample(count: u64) -> BTreeMap<Handle, u64> {
        (1..=count)
            .map(|h| (Handle::new(h * 3 + 0x10), 0x200 + h * 57))
            .collect()
    }

    #[test]
    fn test_reads_written_table() {
        for count in [0, 1, 5, 1500] {
            let map = sample(count);
            let bytes = DwgHandleWriter::new(DwgVersion::AC1014).write(&map).unwrap();
            let parsed = DwgHandleReader::new(DwgVersion::AC1014, &bytes).read().unwrap();
            assert_eq!(parsed, map);
        }
    }

    #[test]
    fn test_chunk_crc_verified() {
        let mut bytes = DwgHandleWriter::new(DwgVersion::AC1015)
            .write(&sample(4))
            .unwrap();
        bytes[3] ^= 0x01;
        let err = DwgHandleReader::new(DwgVersion::AC1015, &bytes).read().unwrap_err();
        assert!(matches!(err, DwgError::ChecksumMismatch { .. }));
    }

    /// One chunk holding `payload`, then the terminating chunk.
    fn table_of(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for chunk_payload in [payload, &[][..]] {
            let mut chunk = ((chunk_payload.len() + 2) as u16).to_be_bytes().to_vec();
            chunk.extend_from_slice(chunk_payload);
            let crc = crc::checksum(&chunk);
            bytes.extend_from_slice(&chunk);
            bytes.extend_from_slice(&crc.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_offset_overflow_is_corrupt() {
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        for _ in 0..3 {
            writer.write_modular_char(1);
            writer.write_signed_modular_char((1 << 62) - 1);
        }
        let bytes = table_of(&writer.finish());
        let err = DwgHandleReader::new(DwgVersion::AC1015, &bytes).read().unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }), "{:?}", err);
    }

    #[test]
    fn test_handle_overflow_is_corrupt() {
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        for _ in 0..3 {
            writer.write_modular_char(u64::MAX >> 1);
            writer.write_signed_modular_char(0x100);
        }
        let bytes = table_of(&writer.finish());
        let err = DwgHandleReader::new(DwgVersion::AC1015, &bytes).read().unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }), "{:?}", err);
    }

    #[test]
    fn test_truncated_table() {
        let bytes = DwgHandleWriter::new(DwgVersion::AC1015)
            .write(&sample(4))
            .unwrap();
        let err = DwgHandleReader::new(DwgVersion::AC1015, &bytes[..bytes.len() - 3])
            .read()
            .unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }));
    }
}
