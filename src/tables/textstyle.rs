//! Text style table entry

use crate::error::Result;
use crate::io::dwg::field_io::FieldIo;
use crate::io::dwg::object_type::DwgObjectType;
use crate::objects::{ObjectCommon, ObjectKind, TableEntryData};

const SHAPE_FILE: i16 = 0x01;
const VERTICAL: i16 = 0x04;

/// A text style (or shape file) table entry
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub common: ObjectCommon,
    pub entry: TableEntryData,
    /// Shape file and vertical bits, see the accessors
    pub flags: i16,
    /// Fixed text height, 0 when variable
    pub height: f64,
    pub width_factor: f64,
    /// Oblique angle in radians
    pub oblique_angle: f64,
    /// 2 backwards, 4 upside down
    pub generation: u8,
    pub last_height: f64,
    pub font_file: String,
    pub big_font_file: String,
}

impl Style {
    pub fn new(name: impl Into<String>) -> Self {
        Style {
            entry: TableEntryData::new(name),
            ..Default::default()
        }
    }

    /// The "STANDARD" style.
    pub fn standard() -> Self {
        Style {
            font_file: "txt".to_string(),
            ..Self::new("STANDARD")
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.flags & VERTICAL != 0
    }

    pub fn set_vertical(&mut self, value: bool) {
        if value {
            self.flags |= VERTICAL;
        } else {
            self.flags &= !VERTICAL;
        }
    }

    pub fn is_shape_file(&self) -> bool {
        self.flags & SHAPE_FILE != 0
    }

    pub fn set_shape_file(&mut self, value: bool) {
        if value {
            self.flags |= SHAPE_FILE;
        } else {
            self.flags &= !SHAPE_FILE;
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Style {
            common: ObjectCommon::default(),
            entry: TableEntryData::default(),
            flags: 0,
            height: 0.0,
            width_factor: 1.0,
            oblique_angle: 0.0,
            generation: 0,
            last_height: 0.2,
            font_file: String::new(),
            big_font_file: String::new(),
        }
    }
}

impl ObjectKind for Style {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::Style;

    table_entry_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_prefix(io)?;

        let mut vertical = self.is_vertical();
        let mut shape_file = self.is_shape_file();
        io.bit(&mut vertical)?;
        io.bit(&mut shape_file)?;
        if io.is_reading() {
            self.set_vertical(vertical);
            self.set_shape_file(shape_file);
        }

        io.bit_double(&mut self.height)?;
        io.bit_double(&mut self.width_factor)?;
        io.bit_double(&mut self.oblique_angle)?;
        io.raw_char(&mut self.generation)?;
        io.bit_double(&mut self.last_height)?;
        io.text(&mut self.font_file)?;
        io.text(&mut self.big_font_file)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_xref_block(io)
    }
}
