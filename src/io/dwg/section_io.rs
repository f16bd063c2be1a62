//! Version flags, sentinel checking and block framing shared by every
//! section reader/writer.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::sentinels;
use crate::io::dwg::crc;
use crate::notification::{Notification, NotificationType};
use crate::types::DwgVersion;

/// A checksummed block taken apart by [`SectionIO::unframe`].
#[derive(Debug)]
pub struct FramedSection<'a> {
    /// Payload between the size field and the CRC.
    pub data: &'a [u8],
    /// Bytes consumed including both sentinels.
    pub consumed: usize,
    /// Sentinel warnings raised under the failsafe policy.
    pub warnings: Vec<Notification>,
}

/// Pre-computed version flags, making version-conditional fields concise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionIO {
    version: DwgVersion,

    /// R13-R14 only
    pub r13_14_only: bool,
    /// R2000+ (AC1015)
    pub r2000_plus: bool,
}

impl SectionIO {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            r13_14_only: matches!(version, DwgVersion::AC1012 | DwgVersion::AC1014),
            r2000_plus: version >= DwgVersion::AC1015,
            version,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    /// Validate a sentinel, returning a `Notification` on mismatch.
    pub fn validate_sentinel(
        actual: &[u8],
        expected: &[u8; 16],
        section_name: &str,
    ) -> Option<Notification> {
        if actual == expected {
            None
        } else {
            Some(Notification::new(
                NotificationType::Warning,
                format!("Invalid section sentinel found in {}", section_name),
            ))
        }
    }

    /// Check a sentinel, either downgrading a mismatch to a notification
    /// (`failsafe`) or failing with [`DwgError::InvalidSentinel`].
    pub fn check_sentinel(
        actual: &[u8],
        expected: &[u8; 16],
        section_name: &str,
        failsafe: bool,
    ) -> Result<Option<Notification>> {
        match Self::validate_sentinel(actual, expected, section_name) {
            None => Ok(None),
            Some(n) if failsafe => Ok(Some(n)),
            Some(_) => Err(DwgError::InvalidSentinel(section_name.to_string())),
        }
    }

    /// Wrap `data` as start sentinel, RL size, data, RS CRC, end sentinel.
    pub fn frame(section_name: &str, data: &[u8]) -> Result<Vec<u8>> {
        let (start, end) = Self::sentinels_of(section_name)?;

        let mut crc_region = Vec::with_capacity(data.len() + 4);
        crc_region.write_i32::<LittleEndian>(data_len(data.len(), section_name)?)?;
        crc_region.extend_from_slice(data);

        let mut output = Vec::with_capacity(crc_region.len() + 34);
        output.extend_from_slice(start);
        output.extend_from_slice(&crc_region);
        output.write_u16::<LittleEndian>(crc::checksum(&crc_region))?;
        output.extend_from_slice(end);

        tracing::debug!(section = section_name, size = data.len(), "framed section");
        Ok(output)
    }

    /// Undo [`SectionIO::frame`], verifying the CRC and both sentinels.
    pub fn unframe<'a>(
        section_name: &str,
        bytes: &'a [u8],
        failsafe: bool,
    ) -> Result<FramedSection<'a>> {
        let (start, end) = Self::sentinels_of(section_name)?;
        if bytes.len() < 20 {
            return Err(DwgError::corrupt(
                (bytes.len() * 8) as u64,
                format!("{} truncated before its size field", section_name),
            ));
        }
        let mut warnings = Vec::new();
        let mut cursor = Cursor::new(bytes);

        let mut sentinel = [0u8; 16];
        cursor.read_exact(&mut sentinel)?;
        warnings.extend(Self::check_sentinel(&sentinel, start, section_name, failsafe)?);

        let size = cursor.read_i32::<LittleEndian>()?;
        let size = usize::try_from(size).map_err(|_| {
            DwgError::corrupt(16 * 8, format!("negative size {} in {}", size, section_name))
        })?;
        let data_start = 20;
        let data_end = data_start + size;
        if data_end.saturating_add(18) > bytes.len() {
            return Err(DwgError::corrupt(
                (data_start * 8) as u64,
                format!("{} overruns the buffer ({} bytes)", section_name, size),
            ));
        }

        cursor.set_position(data_end as u64);
        let stored = cursor.read_u16::<LittleEndian>()?;
        let computed = crc::checksum(&bytes[16..data_end]);
        if stored != computed {
            return Err(DwgError::ChecksumMismatch {
                section: section_name.to_string(),
                expected: stored,
                actual: computed,
            });
        }

        cursor.read_exact(&mut sentinel)?;
        warnings.extend(Self::check_sentinel(&sentinel, end, section_name, failsafe)?);

        tracing::debug!(section = section_name, size, "unframed section");
        Ok(FramedSection {
            data: &bytes[data_start..data_end],
            consumed: data_end + 18,
            warnings,
        })
    }

    fn sentinels_of(section_name: &str) -> Result<(&'static [u8; 16], &'static [u8; 16])> {
        sentinels::for_section(section_name)
            .ok_or_else(|| DwgError::InvalidSentinel(section_name.to_string()))
    }
}

fn data_len(len: usize, section_name: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        DwgError::corrupt(0, format!("{} too large to frame ({} bytes)", section_name, len))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::constants::section_names;

    #[test]
    fn test_unframe_truncated_before_size() {
        let err = SectionIO::unframe(section_names::HEADER, &[0u8; 10], true).unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { .. }), "{:?}", err);
    }

    #[test]
    fn test_unframe_truncated_before_crc() {
        let framed = SectionIO::frame(section_names::CLASSES, &[1, 2, 3, 4]).unwrap();
        for len in [16, 20, 25, framed.len() - 1] {
            let err = SectionIO::unframe(section_names::CLASSES, &framed[..len], true).unwrap_err();
            assert!(matches!(err, DwgError::CorruptStream { .. }), "{}: {:?}", len, err);
        }
    }

    #[test]
    fn test_version_flags() {
        let r13 = SectionIO::new(DwgVersion::AC1012);
        assert!(r13.r13_14_only);
        assert!(!r13.r2000_plus);

        let r14 = SectionIO::new(DwgVersion::AC1014);
        assert!(r14.r13_14_only);
        assert!(!r14.r2000_plus);

        let r2000 = SectionIO::new(DwgVersion::AC1015);
        assert!(!r2000.r13_14_only);
        assert!(r2000.r2000_plus);
        assert_eq!(r2000.version(), DwgVersion::AC1015);
    }

    #[test]
    fn test_validate_sentinel() {
        assert!(SectionIO::validate_sentinel(
            &sentinels::HEADER_START,
            &sentinels::HEADER_START,
            "AcDb:Header"
        )
        .is_none());
        let n = SectionIO::validate_sentinel(
            &sentinels::HEADER_END,
            &sentinels::HEADER_START,
            "AcDb:Header",
        )
        .unwrap();
        assert_eq!(n.notification_type, NotificationType::Warning);
    }

    #[test]
    fn test_check_sentinel_strict() {
        let r = SectionIO::check_sentinel(
            &[0u8; 16],
            &sentinels::CLASSES_START,
            "AcDb:Classes",
            false,
        );
        assert!(matches!(r, Err(DwgError::InvalidSentinel(_))));
        let r = SectionIO::check_sentinel(
            &[0u8; 16],
            &sentinels::CLASSES_START,
            "AcDb:Classes",
            true,
        );
        assert!(r.unwrap().is_some());
    }

    #[test]
    fn test_frame_layout() {
        let framed = SectionIO::frame(section_names::HEADER, &[1, 2, 3]).unwrap();
        assert_eq!(framed.len(), 16 + 4 + 3 + 2 + 16);
        assert_eq!(&framed[..16], &sentinels::HEADER_START);
        assert_eq!(&framed[16..20], &[3, 0, 0, 0]);
        assert_eq!(&framed[framed.len() - 16..], &sentinels::HEADER_END);
    }

    #[test]
    fn test_unframe_returns_payload() {
        let framed = SectionIO::frame(section_names::CLASSES, &[9, 8, 7, 6]).unwrap();
        let section = SectionIO::unframe(section_names::CLASSES, &framed, false).unwrap();
        assert_eq!(section.data, &[9, 8, 7, 6]);
        assert_eq!(section.consumed, framed.len());
        assert!(section.warnings.is_empty());
    }

    #[test]
    fn test_unframe_detects_flipped_byte() {
        let mut framed = SectionIO::frame(section_names::HEADER, &[0x55; 12]).unwrap();
        framed[25] ^= 0x01;
        let err = SectionIO::unframe(section_names::HEADER, &framed, true).unwrap_err();
        assert!(matches!(err, DwgError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_unframe_sentinel_policy() {
        let mut framed = SectionIO::frame(section_names::HEADER, &[1]).unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 0xFF;
        let lenient = SectionIO::unframe(section_names::HEADER, &framed, true).unwrap();
        assert_eq!(lenient.warnings.len(), 1);
        let strict = SectionIO::unframe(section_names::HEADER, &framed, false);
        assert!(matches!(strict, Err(DwgError::InvalidSentinel(_))));
    }
}
