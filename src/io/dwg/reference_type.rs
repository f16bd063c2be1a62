//! Handle references between objects.
//!
//! On disk a reference is `|CODE (4 bits)|COUNTER (4 bits)|HANDLE bytes (N)|`.
//! The code says whether the value is an absolute handle carrying an
//! ownership/pointer meaning, or an offset from the referencing object's own
//! handle.

use crate::types::Handle;

/// Reference code stored in the high nibble of a handle reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DwgReferenceType {
    /// Plain absolute handle (code 0)
    #[default]
    None = 0,
    /// Soft ownership (code 2)
    SoftOwner = 2,
    /// Hard ownership (code 3)
    HardOwner = 3,
    /// Soft pointer (code 4)
    SoftPointer = 4,
    /// Hard pointer (code 5)
    HardPointer = 5,
    /// Owner handle + 1 (code 6)
    PlusOne = 6,
    /// Owner handle - 1 (code 8)
    MinusOne = 8,
    /// Owner handle + value (code 0xA)
    PlusOffset = 0xA,
    /// Owner handle - value (code 0xC)
    MinusOffset = 0xC,
}

impl DwgReferenceType {
    /// Decode a reference code nibble.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DwgReferenceType::None),
            2 => Some(DwgReferenceType::SoftOwner),
            3 => Some(DwgReferenceType::HardOwner),
            4 => Some(DwgReferenceType::SoftPointer),
            5 => Some(DwgReferenceType::HardPointer),
            6 => Some(DwgReferenceType::PlusOne),
            8 => Some(DwgReferenceType::MinusOne),
            0xA => Some(DwgReferenceType::PlusOffset),
            0xC => Some(DwgReferenceType::MinusOffset),
            _ => None,
        }
    }

    /// Whether the value is an offset from the referencing object's handle.
    pub fn is_offset(&self) -> bool {
        matches!(
            self,
            DwgReferenceType::PlusOne
                | DwgReferenceType::MinusOne
                | DwgReferenceType::PlusOffset
                | DwgReferenceType::MinusOffset
        )
    }

    /// Whether the code expresses ownership of the target.
    pub fn is_ownership(&self) -> bool {
        matches!(self, DwgReferenceType::SoftOwner | DwgReferenceType::HardOwner)
    }
}

/// A reference from one object to another, as stored in the bit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HandleReference {
    pub code: DwgReferenceType,
    /// Absolute handle for codes 0-5, magnitude of the offset otherwise.
    pub value: u64,
}

impl HandleReference {
    /// The explicit null reference: code `None`, value 0.
    pub const NULL: HandleReference = HandleReference {
        code: DwgReferenceType::None,
        value: 0,
    };

    pub const fn new(code: DwgReferenceType, value: u64) -> Self {
        Self { code, value }
    }

    /// Absolute reference of the given kind to `handle`.
    pub const fn to_handle(code: DwgReferenceType, handle: Handle) -> Self {
        Self {
            code,
            value: handle.value(),
        }
    }

    /// A null target with a specific reference code.
    pub const fn null_of(code: DwgReferenceType) -> Self {
        Self { code, value: 0 }
    }

    /// True only for the explicit null representation.
    pub fn is_empty(&self) -> bool {
        self.code == DwgReferenceType::None && self.value == 0
    }

    /// Absolute handle this reference denotes, given the handle of the object holding it.
    pub fn resolve_next(&self, owner: Handle) -> Handle {
        let base = owner.value();
        let target = match self.code {
            DwgReferenceType::None
            | DwgReferenceType::SoftOwner
            | DwgReferenceType::HardOwner
            | DwgReferenceType::SoftPointer
            | DwgReferenceType::HardPointer => self.value,
            DwgReferenceType::PlusOne => base.wrapping_add(1),
            DwgReferenceType::MinusOne => base.wrapping_sub(1),
            DwgReferenceType::PlusOffset => base.wrapping_add(self.value),
            DwgReferenceType::MinusOffset => base.wrapping_sub(self.value),
        };
        Handle::new(target)
    }

    /// Whether the resolved target is the null handle.
    pub fn points_to_null(&self, owner: Handle) -> bool {
        self.resolve_next(owner).is_null()
    }

    /// Number of magnitude bytes written after the code byte.
    pub fn counter(&self) -> u8 {
        match self.code {
            DwgReferenceType::PlusOne | DwgReferenceType::MinusOne => 0,
            _ => Handle::new(self.value).byte_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Handle = Handle::new(0x10);

    #[test]
    fn test_reference_type_from_code() {
        assert_eq!(DwgReferenceType::from_code(2), Some(DwgReferenceType::SoftOwner));
        assert_eq!(DwgReferenceType::from_code(5), Some(DwgReferenceType::HardPointer));
        assert_eq!(DwgReferenceType::from_code(0xC), Some(DwgReferenceType::MinusOffset));
        assert_eq!(DwgReferenceType::from_code(1), None);
        assert_eq!(DwgReferenceType::from_code(7), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(HandleReference::NULL.is_empty());
        assert!(HandleReference::default().is_empty());
        assert!(!HandleReference::null_of(DwgReferenceType::HardPointer).is_empty());
        assert!(!HandleReference::new(DwgReferenceType::None, 3).is_empty());
    }

    #[test]
    fn test_resolve_absolute() {
        let r = HandleReference::new(DwgReferenceType::SoftPointer, 0x1A);
        assert_eq!(r.resolve_next(OWNER), Handle::new(0x1A));
    }

    #[test]
    fn test_resolve_offsets() {
        let plus1 = HandleReference::new(DwgReferenceType::PlusOne, 0);
        let minus1 = HandleReference::new(DwgReferenceType::MinusOne, 0);
        let plus = HandleReference::new(DwgReferenceType::PlusOffset, 5);
        let minus = HandleReference::new(DwgReferenceType::MinusOffset, 3);
        assert_eq!(plus1.resolve_next(OWNER), Handle::new(0x11));
        assert_eq!(minus1.resolve_next(OWNER), Handle::new(0x0F));
        assert_eq!(plus.resolve_next(OWNER), Handle::new(0x15));
        assert_eq!(minus.resolve_next(OWNER), Handle::new(0x0D));
    }

    #[test]
    fn test_points_to_null() {
        assert!(HandleReference::null_of(DwgReferenceType::HardPointer).points_to_null(OWNER));
        assert!(HandleReference::new(DwgReferenceType::MinusOffset, 0x10).points_to_null(OWNER));
        assert!(HandleReference::new(DwgReferenceType::MinusOne, 0).points_to_null(Handle::new(1)));
        assert!(!HandleReference::new(DwgReferenceType::PlusOne, 0).points_to_null(OWNER));
    }

    #[test]
    fn test_counter() {
        assert_eq!(HandleReference::new(DwgReferenceType::PlusOne, 0).counter(), 0);
        assert_eq!(HandleReference::new(DwgReferenceType::SoftOwner, 0x1A).counter(), 1);
        assert_eq!(HandleReference::new(DwgReferenceType::HardPointer, 0x1234).counter(), 2);
    }
}
