//! Writer for the object map table.
//!
//! The table is a run of chunks, each at most 2032 bytes: a big-endian size
//! (counting its own two bytes), `(MC handle delta, signed MC offset delta)`
//! pairs and a big-endian CRC. Deltas restart from zero in every chunk. An
//! empty chunk of size 2 ends the table.

use std::collections::BTreeMap;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::Result;
use crate::io::dwg::constants::HANDLE_SECTION_CHUNK_LIMIT;
use crate::io::dwg::crc;
use crate::io::dwg::writer::DwgStreamWriter;
use crate::types::{DwgVersion, Handle};

pub struct DwgHandleWriter {
    version: DwgVersion,
}

impl DwgHandleWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self { version }
    }

    /// Encode `handle_map` (handle to absolute file offset).
    pub fn write(&self, handle_map: &BTreeMap<Handle, u64>) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut chunk: Vec<u8> = Vec::new();
        let mut prev_handle = 0u64;
        let mut prev_offset = 0i64;

        for (&handle, &offset) in handle_map {
            let offset = offset as i64;
            let mut pair = self.encode_pair(handle.value() - prev_handle, offset - prev_offset);

            if chunk.len() + 2 + pair.len() > HANDLE_SECTION_CHUNK_LIMIT {
                Self::flush_chunk(&mut output, &chunk)?;
                chunk.clear();
                pair = self.encode_pair(handle.value(), offset);
            }

            chunk.extend_from_slice(&pair);
            prev_handle = handle.value();
            prev_offset = offset;
        }

        if !chunk.is_empty() {
            Self::flush_chunk(&mut output, &chunk)?;
        }
        Self::flush_chunk(&mut output, &[])?;

        tracing::debug!(entries = handle_map.len(), size = output.len(), "wrote object map");
        Ok(output)
    }

    fn encode_pair(&self, handle_delta: u64, offset_delta: i64) -> Vec<u8> {
        let mut writer = DwgStreamWriter::new(self.version);
        writer.write_modular_char(handle_delta);
        writer.write_signed_modular_char(offset_delta);
        writer.finish()
    }

    fn flush_chunk(output: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
        let start = output.len();
        // Payload length is bounded by HANDLE_SECTION_CHUNK_LIMIT.
        output.write_u16::<BigEndian>((payload.len() + 2) as u16)?;
        output.extend_from_slice(payload);
        let crc = crc::checksum(&output[start..]);
        output.write_u16::<BigEndian>(crc)?;
        Ok(())
    }
}
