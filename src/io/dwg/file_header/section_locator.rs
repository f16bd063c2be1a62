//! Locator records of the file header.

/// Where one checksummed section lives in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DwgSectionLocatorRecord {
    /// 0 header variables, 1 classes, 2 object map
    pub number: u8,
    /// Absolute byte offset of the section
    pub seeker: u32,
    pub size: u32,
}

impl DwgSectionLocatorRecord {
    /// Bytes taken by one record: RC number, RL seeker, RL size.
    pub const SIZE: usize = 9;

    pub fn new(number: u8, seeker: u32, size: u32) -> Self {
        Self {
            number,
            seeker,
            size,
        }
    }

    /// Byte range covered by the section.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.seeker as usize;
        start..start + self.size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let rec = DwgSectionLocatorRecord::new(2, 0x1234, 0x10);
        assert_eq!(rec.range(), 0x1234..0x1244);
    }
}
