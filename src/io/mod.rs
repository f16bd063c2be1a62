//! I/O module for reading and writing DWG files

pub mod dwg;

pub use dwg::{DwgReader, DwgReaderConfiguration, DwgWriter, DwgWriterConfiguration};
