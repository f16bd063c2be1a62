//! Error types for dwgcodec

use std::io;
use thiserror::Error;

use crate::types::Handle;

/// Main error type for dwgcodec operations.
///
/// Every variant is terminal for the load or save that raised it.
#[derive(Debug, Error)]
pub enum DwgError {
    /// IO error from the byte source or sink
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A primitive read ran past the available bits or decoded an invalid code
    #[error("Corrupt stream at bit {position_in_bits}: {reason}")]
    CorruptStream {
        position_in_bits: u64,
        reason: String,
    },

    /// The type tag at a resolved offset is not part of the supported set
    #[error("Unknown object type: {0:#X}")]
    UnknownObjectType(i16),

    /// A referenced handle has no entry in the object map table
    #[error("Dangling handle: {0}")]
    DanglingHandle(Handle),

    /// A structural invariant of the object graph does not hold
    #[error("Malformed document at handle {handle}: {reason}")]
    MalformedDocument { handle: Handle, reason: String },

    /// CRC checksum mismatch
    #[error("CRC checksum mismatch in {section}: expected {expected:#06X}, got {actual:#06X}")]
    ChecksumMismatch {
        section: String,
        expected: u16,
        actual: u16,
    },

    /// Unsupported CAD file version
    #[error("Unsupported DWG version: {0:?}")]
    UnsupportedVersion(String),

    /// Invalid sentinel in file
    #[error("Invalid sentinel: {0}")]
    InvalidSentinel(String),
}

impl DwgError {
    /// Build a [`DwgError::MalformedDocument`] for the given object.
    pub fn malformed(handle: Handle, reason: impl Into<String>) -> Self {
        DwgError::MalformedDocument {
            handle,
            reason: reason.into(),
        }
    }

    /// Build a [`DwgError::CorruptStream`] at the given bit offset.
    pub fn corrupt(position_in_bits: u64, reason: impl Into<String>) -> Self {
        DwgError::CorruptStream {
            position_in_bits,
            reason: reason.into(),
        }
    }
}

/// Result type alias for dwgcodec operations
pub type Result<T> = std::result::Result<T, DwgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DwgError::UnsupportedVersion("AC1009".to_string());
        assert_eq!(err.to_string(), "Unsupported DWG version: \"AC1009\"");
    }

    #[test]
    fn test_checksum_error() {
        let err = DwgError::ChecksumMismatch {
            section: "AcDb:Header".to_string(),
            expected: 0x1234,
            actual: 0x5678,
        };
        let text = err.to_string();
        assert!(text.contains("0x1234"));
        assert!(text.contains("0x5678"));
        assert!(text.contains("AcDb:Header"));
    }

    #[test]
    fn test_malformed_names_handle() {
        let err = DwgError::malformed(Handle::new(0x2A), "incorrect layer handle code");
        assert_eq!(
            err.to_string(),
            "Malformed document at handle 0x2A: incorrect layer handle code"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DwgError = io_err.into();
        assert!(matches!(err, DwgError::Io(_)));
    }
}
