//! # dwgcodec
//!
//! A pure Rust reader and writer for the bit-packed object graph of DWG
//! files, releases R13 (AC1012), R14 (AC1014) and 2000 (AC1015).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dwgcodec::{Drawing, DwgVersion, Line, Vector3};
//!
//! let mut drawing = Drawing::new(DwgVersion::AC1015);
//! drawing.add_entity_to_model_space(Line::from_points(
//!     Vector3::ZERO,
//!     Vector3::new(10.0, 0.0, 0.0),
//! ))?;
//!
//! let bytes = drawing.to_bytes()?;
//! let reopened = Drawing::open(&bytes)?;
//! # Ok::<(), dwgcodec::DwgError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`io::dwg::reader::DwgStreamReader`] / [`io::dwg::writer::DwgStreamWriter`] -
//!   bit-level primitives
//! - [`io::dwg::field_io::FieldIo`] - one field description drives both directions
//! - [`objects::ObjectArena`] - owns every object; links are [`objects::ObjectId`]s
//! - [`io::dwg::reader::ObjectCache`] - resolves handles on demand while reading
//! - [`io::dwg::writer::ObjectMap`] - assigns handles before writing
//! - [`Drawing`] - the façade tying header, classes and objects together

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classes;
pub mod document;
pub mod entities;
pub mod error;
pub mod header;
pub mod io;
pub mod notification;
pub mod objects;
pub mod tables;
pub mod types;
pub mod xdata;

// Re-export commonly used types
pub use error::{DwgError, Result};
pub use types::{Color, DwgVersion, Handle, Vector2, Vector3};

// Re-export entity types
pub use entities::{Arc, Block, Circle, EndBlock, Line, Polyline2D, SeqEnd, Vertex2D};

// Re-export table types
pub use tables::{BlockControl, BlockHeader, DimStyle, Layer, LineType, Style, TableEntry};

// Re-export the object model
pub use objects::{DwgObject, ObjectArena, ObjectId, ObjectKind};

// Re-export document
pub use document::Drawing;
pub use header::HeaderVariables;

// Re-export I/O types
pub use io::dwg::{DwgReader, DwgReaderConfiguration, DwgWriter, DwgWriterConfiguration};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_drawing_creation() {
        let drawing = Drawing::default();
        assert_eq!(drawing.version, DwgVersion::AC1015);

        let drawing = Drawing::new(DwgVersion::AC1012);
        assert_eq!(drawing.version, DwgVersion::AC1012);
    }
}
