//! DWG bit-level stream writer and section writers.
//!
//! - [`stream_writer`]: bit-level primitive encoding
//! - [`header_writer`]: `AcDb:Header` block (header variables)
//! - [`classes_writer`]: `AcDb:Classes` block
//! - [`handle_writer`]: object map table
//! - [`object_map`]: handle assignment before emission
//! - [`object_writer`]: object records
//! - [`dwg_writer`]: the whole-file layout

pub mod classes_writer;
pub mod dwg_writer;
pub mod handle_writer;
pub mod header_writer;
pub mod object_map;
pub mod object_writer;
pub mod stream_writer;

pub use classes_writer::DwgClassesWriter;
pub use dwg_writer::{DwgWriter, DwgWriterConfiguration};
pub use handle_writer::DwgHandleWriter;
pub use header_writer::DwgHeaderWriter;
pub use object_map::ObjectMap;
pub use object_writer::{DwgObjectWriter, ObjectsSection};
pub use stream_writer::DwgStreamWriter;
