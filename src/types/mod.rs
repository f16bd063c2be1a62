//! Value types shared by the codec and the object model

pub mod color;
pub mod date_time;
pub mod handle;
pub mod vector;
pub mod version;

pub use color::Color;
pub use date_time::{DwgDateTime, DwgTimeSpan};
pub use handle::Handle;
pub use vector::{Vector2, Vector3};
pub use version::DwgVersion;
