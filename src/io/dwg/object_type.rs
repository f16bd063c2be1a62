//! DWG object type codes.
//!
//! Every object record starts with a BS type tag. Only the fixed codes of
//! the supported entity and table types are recognized; anything else is an
//! [`DwgError::UnknownObjectType`].

use crate::error::{DwgError, Result};

/// Fixed DWG object type codes of the supported object set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum DwgObjectType {
    Block = 4,
    EndBlock = 5,
    SeqEnd = 6,
    Vertex2D = 0x0A,
    Polyline2D = 0x0F,
    Arc = 0x11,
    Circle = 0x12,
    Line = 0x13,
    BlockControl = 0x30,
    BlockHeader = 0x31,
    LayerControl = 0x32,
    Layer = 0x33,
    StyleControl = 0x34,
    Style = 0x35,
    LineTypeControl = 0x38,
    LineType = 0x39,
    DimStyleControl = 0x44,
    DimStyle = 0x45,
}

impl DwgObjectType {
    pub const ALL: [DwgObjectType; 18] = [
        Self::Block,
        Self::EndBlock,
        Self::SeqEnd,
        Self::Vertex2D,
        Self::Polyline2D,
        Self::Arc,
        Self::Circle,
        Self::Line,
        Self::BlockControl,
        Self::BlockHeader,
        Self::LayerControl,
        Self::Layer,
        Self::StyleControl,
        Self::Style,
        Self::LineTypeControl,
        Self::LineType,
        Self::DimStyleControl,
        Self::DimStyle,
    ];

    /// Decode a raw type tag.
    pub fn from_raw(value: i16) -> Result<Self> {
        Ok(match value {
            4 => Self::Block,
            5 => Self::EndBlock,
            6 => Self::SeqEnd,
            0x0A => Self::Vertex2D,
            0x0F => Self::Polyline2D,
            0x11 => Self::Arc,
            0x12 => Self::Circle,
            0x13 => Self::Line,
            0x30 => Self::BlockControl,
            0x31 => Self::BlockHeader,
            0x32 => Self::LayerControl,
            0x33 => Self::Layer,
            0x34 => Self::StyleControl,
            0x35 => Self::Style,
            0x38 => Self::LineTypeControl,
            0x39 => Self::LineType,
            0x44 => Self::DimStyleControl,
            0x45 => Self::DimStyle,
            other => return Err(DwgError::UnknownObjectType(other)),
        })
    }

    pub fn as_raw(self) -> i16 {
        self as i16
    }

    /// Whether records of this type carry the entity common data.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::EndBlock
                | Self::SeqEnd
                | Self::Vertex2D
                | Self::Polyline2D
                | Self::Arc
                | Self::Circle
                | Self::Line
        )
    }

    /// Whether this is one of the five table control objects.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Self::BlockControl
                | Self::LayerControl
                | Self::StyleControl
                | Self::LineTypeControl
                | Self::DimStyleControl
        )
    }

    /// Entry type held by a control object.
    pub fn entry_type(self) -> Option<DwgObjectType> {
        match self {
            Self::BlockControl => Some(Self::BlockHeader),
            Self::LayerControl => Some(Self::Layer),
            Self::StyleControl => Some(Self::Style),
            Self::LineTypeControl => Some(Self::LineType),
            Self::DimStyleControl => Some(Self::DimStyle),
            _ => None,
        }
    }

    /// Control object holding entries of this type.
    pub fn control_type(self) -> Option<DwgObjectType> {
        match self {
            Self::BlockHeader => Some(Self::BlockControl),
            Self::Layer => Some(Self::LayerControl),
            Self::Style => Some(Self::StyleControl),
            Self::LineType => Some(Self::LineTypeControl),
            Self::DimStyle => Some(Self::DimStyleControl),
            _ => None,
        }
    }
}

impl std::fmt::Display for DwgObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({:#X})", self, self.as_raw())
    }
}
