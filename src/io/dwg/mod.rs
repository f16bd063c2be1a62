//! DWG file format reader/writer support for R13, R14 and R2000.
//!
//! # Module Structure
//!
//! - [`constants`]: Section names, locator numbers, sentinels
//! - [`crc`]: The 16-bit checksum protecting every block and record
//! - [`code_page`]: File header code page to text encoding
//! - [`field_io`]: Direction-agnostic field codec shared by readers and writers
//! - [`reference_type`]: Handle reference codes and resolution
//! - [`object_type`]: The closed set of record type tags
//! - [`section_io`]: Version flags and block framing
//! - [`file_header`]: The fixed file header and its section locators
//! - [`reader`] / [`writer`]: Stream codecs, section codecs and the file pipelines

pub mod code_page;
pub mod constants;
pub mod crc;
pub mod field_io;
pub mod file_header;
pub mod object_type;
pub mod reader;
pub mod reference_type;
pub mod section_io;
pub mod writer;

// Re-export commonly used types
pub use file_header::{DwgFileHeader, DwgSectionLocatorRecord};
pub use object_type::DwgObjectType;
pub use reader::{DwgReader, DwgReaderConfiguration};
pub use reference_type::{DwgReferenceType, HandleReference};
pub use section_io::SectionIO;
pub use writer::{DwgWriter, DwgWriterConfiguration};
