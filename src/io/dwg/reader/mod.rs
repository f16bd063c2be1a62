//! DWG bit-level stream reader and section readers.
//!
//! - [`stream_reader`]: bit-level primitive decoding
//! - [`header_reader`]: `AcDb:Header` block (header variables)
//! - [`classes_reader`]: `AcDb:Classes` block
//! - [`handle_reader`]: object map table
//! - [`object_cache`]: on-demand object resolution
//! - [`dwg_reader`]: the whole-file pipeline

pub mod classes_reader;
pub mod dwg_reader;
pub mod handle_reader;
pub mod header_reader;
pub mod object_cache;
pub mod stream_reader;

pub use classes_reader::{ClassesSection, DwgClassesReader};
pub use dwg_reader::{DwgReader, DwgReaderConfiguration};
pub use handle_reader::DwgHandleReader;
pub use header_reader::{DwgHeaderReader, HeaderSection};
pub use object_cache::ObjectCache;
pub use stream_reader::DwgStreamReader;
