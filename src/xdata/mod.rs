//! Extended entity data (EED)
//!
//! Each record is tagged with the handle of the registering application and
//! carries an opaque run of bytes. The codec stores the bytes as-is.

use crate::error::{DwgError, Result};
use crate::io::dwg::field_io::{wire_count, FieldIo};
use crate::io::dwg::reference_type::HandleReference;
use crate::types::Handle;

/// Extended data attached by one application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedDataRecord {
    /// APPID handle of the registering application
    pub application: HandleReference,
    /// Raw EED bytes
    pub data: Vec<u8>,
}

impl ExtendedDataRecord {
    pub fn new(application: HandleReference, data: Vec<u8>) -> Self {
        Self { application, data }
    }
}

/// Read or write the EED block: `BS size, H app, size bytes` until a zero size.
///
/// Records without data are not written, since a zero size ends the block.
pub(crate) fn visit_extended_data<F: FieldIo>(
    io: &mut F,
    records: &mut Vec<ExtendedDataRecord>,
    owner: Handle,
) -> Result<()> {
    if io.is_reading() {
        records.clear();
        loop {
            let mut size = 0i16;
            io.bit_short(&mut size)?;
            if size == 0 {
                return Ok(());
            }
            let length = usize::try_from(size).map_err(|_| {
                DwgError::malformed(owner, format!("negative extended data size {}", size))
            })?;
            let mut record = ExtendedDataRecord::default();
            io.handle(&mut record.application)?;
            io.raw_bytes(&mut record.data, length)?;
            records.push(record);
        }
    }

    for record in records.iter_mut().filter(|r| !r.data.is_empty()) {
        let mut size: i16 = wire_count(record.data.len(), owner, "extended data bytes")?;
        io.bit_short(&mut size)?;
        io.handle(&mut record.application)?;
        let length = record.data.len();
        io.raw_bytes(&mut record.data, length)?;
    }
    let mut terminator = 0i16;
    io.bit_short(&mut terminator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::reference_type::DwgReferenceType;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    #[test]
    fn test_records_survive() {
        let mut records = vec![
            ExtendedDataRecord::new(
                HandleReference::new(DwgReferenceType::SoftPointer, 0x12),
                vec![0x00, 0x01, 0xFF],
            ),
            ExtendedDataRecord::new(HandleReference::new(DwgReferenceType::None, 0x13), vec![7]),
        ];
        let expected = records.clone();

        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        visit_extended_data(&mut writer, &mut records, Handle::new(1)).unwrap();
        let bytes = writer.finish();

        let mut parsed = Vec::new();
        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        visit_extended_data(&mut reader, &mut parsed, Handle::new(1)).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_empty_block_is_single_zero() {
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1012);
        visit_extended_data(&mut writer, &mut Vec::new(), Handle::new(1)).unwrap();
        // BS 0 is the two bits 10
        assert_eq!(writer.finish(), vec![0x80]);
    }
}
