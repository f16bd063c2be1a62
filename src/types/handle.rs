//! Absolute object handles
//!
//! A handle is the document-unique identity of an object in a drawing. It
//! doubles as the object's address in the object map table.

use std::fmt;

/// A document-unique object identifier.
///
/// Handle 0 is reserved as the null target of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Handle(u64);

impl Handle {
    /// The null handle (0)
    pub const NULL: Handle = Handle(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The handle immediately after this one.
    #[inline]
    pub const fn next(&self) -> Handle {
        Handle(self.0.wrapping_add(1))
    }

    /// Number of big-endian bytes needed to store this handle in a reference.
    pub fn byte_count(&self) -> u8 {
        (8 - (self.0.leading_zeros() / 8)) as u8
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert!(!Handle::new(1).is_null());
        assert_eq!(Handle::default(), Handle::NULL);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(Handle::new(0xABCD).to_string(), "0xABCD");
        assert_eq!(format!("{:X}", Handle::new(0xABCD)), "ABCD");
    }

    #[test]
    fn test_byte_count() {
        assert_eq!(Handle::NULL.byte_count(), 0);
        assert_eq!(Handle::new(0x1A).byte_count(), 1);
        assert_eq!(Handle::new(0xFF).byte_count(), 1);
        assert_eq!(Handle::new(0x100).byte_count(), 2);
        assert_eq!(Handle::new(0x12_3456).byte_count(), 3);
        assert_eq!(Handle::new(u64::MAX).byte_count(), 8);
    }

    #[test]
    fn test_next() {
        assert_eq!(Handle::new(0x1F).next(), Handle::new(0x20));
    }
}
