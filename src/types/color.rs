//! Color index values
//!
//! R13 through R2000 store every color as a signed color index (ACI). A
//! negative index on a layer means the layer is switched off, so the raw
//! value is kept untouched.

use std::fmt;

/// An AutoCAD Color Index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub i16);

impl Color {
    /// Color by block (index 0)
    pub const BY_BLOCK: Color = Color(0);
    /// Color by layer (index 256)
    pub const BY_LAYER: Color = Color(256);
    pub const RED: Color = Color(1);
    pub const YELLOW: Color = Color(2);
    pub const GREEN: Color = Color(3);
    pub const CYAN: Color = Color(4);
    pub const BLUE: Color = Color(5);
    pub const MAGENTA: Color = Color(6);
    pub const WHITE: Color = Color(7);

    pub const fn index(&self) -> i16 {
        self.0
    }

    pub const fn is_by_layer(&self) -> bool {
        self.0 == 256
    }

    pub const fn is_by_block(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BY_LAYER
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("ByBlock"),
            256 => f.write_str("ByLayer"),
            i => write!(f, "ACI {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_indices() {
        assert!(Color::default().is_by_layer());
        assert!(Color::BY_BLOCK.is_by_block());
        assert_eq!(Color::RED.to_string(), "ACI 1");
        assert_eq!(Color(-7).index(), -7);
    }
}
