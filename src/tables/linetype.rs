//! Line type table entry

use crate::error::Result;
use crate::io::dwg::constants::{LINETYPE_TEXT_AREA_R13, LINETYPE_TEXT_AREA_R2000};
use crate::io::dwg::field_io::{read_count, wire_count, FieldIo};
use crate::io::dwg::object_type::DwgObjectType;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::objects::{ObjectCommon, ObjectKind, TableEntryData};
use crate::types::Vector2;

/// One dash of a line type pattern
#[derive(Debug, Clone, PartialEq)]
pub struct LineTypeDash {
    /// Dash length, negative for a gap
    pub length: f64,
    pub shape_code: i16,
    pub offset: Vector2,
    pub scale: f64,
    pub rotation: f64,
    /// 1 absolute rotation, 2 text, 4 shape
    pub shape_flags: i16,
    pub shape_file: HandleReference,
}

impl LineTypeDash {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            ..Default::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.shape_flags & 2 != 0
    }
}

impl Default for LineTypeDash {
    fn default() -> Self {
        Self {
            length: 0.0,
            shape_code: 0,
            offset: Vector2::default(),
            scale: 1.0,
            rotation: 0.0,
            shape_flags: 0,
            shape_file: HandleReference::null_of(DwgReferenceType::HardPointer),
        }
    }
}

/// A line type table entry
#[derive(Debug, Clone, PartialEq)]
pub struct LineType {
    pub common: ObjectCommon,
    pub entry: TableEntryData,
    pub description: String,
    pub pattern_length: f64,
    /// Always 'A'
    pub alignment: u8,
    pub dashes: Vec<LineTypeDash>,
    /// Strings of text dashes, fixed size on the wire
    pub text_area: Vec<u8>,
}

impl LineType {
    pub fn new(name: impl Into<String>) -> Self {
        LineType {
            entry: TableEntryData::new(name),
            ..Default::default()
        }
    }

    pub fn by_layer() -> Self {
        Self::new("BYLAYER")
    }

    pub fn by_block() -> Self {
        Self::new("BYBLOCK")
    }

    pub fn continuous() -> Self {
        LineType {
            description: "Solid line".to_string(),
            ..Self::new("CONTINUOUS")
        }
    }

    fn has_text_dash(&self) -> bool {
        self.dashes.iter().any(LineTypeDash::is_text)
    }
}

impl Default for LineType {
    fn default() -> Self {
        LineType {
            common: ObjectCommon::default(),
            entry: TableEntryData::default(),
            description: String::new(),
            pattern_length: 0.0,
            alignment: b'A',
            dashes: Vec::new(),
            text_area: Vec::new(),
        }
    }
}

impl ObjectKind for LineType {
    const OBJECT_TYPE: DwgObjectType = DwgObjectType::LineType;

    table_entry_accessors!();

    fn fields<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        let handle = self.common.handle;
        self.entry.visit_prefix(io)?;
        io.text(&mut self.description)?;
        io.bit_double(&mut self.pattern_length)?;
        io.raw_char(&mut self.alignment)?;

        let mut count: u8 = wire_count(self.dashes.len(), handle, "dashes")?;
        io.raw_char(&mut count)?;
        let count = read_count(count as i64, handle, "dash")?;
        io.repeated(&mut self.dashes, count, |io, dash| {
            io.bit_double(&mut dash.length)?;
            io.bit_short(&mut dash.shape_code)?;
            io.point2_raw(&mut dash.offset)?;
            io.bit_double(&mut dash.scale)?;
            io.bit_double(&mut dash.rotation)?;
            io.bit_short(&mut dash.shape_flags)
        })?;

        let area = if io.sio().r13_14_only {
            LINETYPE_TEXT_AREA_R13
        } else if self.has_text_dash() {
            LINETYPE_TEXT_AREA_R2000
        } else {
            0
        };
        if !io.is_reading() {
            self.text_area.resize(area, 0);
        }
        io.raw_bytes(&mut self.text_area, area)
    }

    fn post_data<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
        self.entry.visit_xref_block(io)?;
        for dash in self.dashes.iter_mut() {
            io.handle(&mut dash.shape_file)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;
    use crate::io::dwg::writer::DwgStreamWriter;
    use crate::types::DwgVersion;

    fn dashed() -> LineType {
        let mut line_type = LineType::new("DASHED");
        line_type.description = "__ __ __".to_string();
        line_type.pattern_length = 0.75;
        line_type.dashes = vec![LineTypeDash::new(0.5), LineTypeDash::new(-0.25)];
        line_type
    }

    fn written_len(line_type: &LineType, version: DwgVersion) -> (LineType, usize) {
        let mut writer = DwgStreamWriter::new(version);
        line_type.clone().fields(&mut writer).unwrap();
        let bytes = writer.finish();
        let mut parsed = LineType::default();
        parsed
            .fields(&mut DwgStreamReader::new(&bytes, version))
            .unwrap();
        (parsed, bytes.len())
    }

    #[test]
    fn test_text_area_sizes() {
        let line_type = dashed();
        let (parsed, r14_len) = written_len(&line_type, DwgVersion::AC1014);
        assert_eq!(parsed.text_area.len(), LINETYPE_TEXT_AREA_R13);
        assert_eq!(parsed.dashes, line_type.dashes);

        let (parsed, r2000_len) = written_len(&line_type, DwgVersion::AC1015);
        assert!(parsed.text_area.is_empty());
        assert!(r14_len > r2000_len + 200);

        let mut text = dashed();
        text.dashes[0].shape_flags = 2;
        let (parsed, _) = written_len(&text, DwgVersion::AC1015);
        assert_eq!(parsed.text_area.len(), LINETYPE_TEXT_AREA_R2000);
        assert!(parsed.dashes[0].is_text());
    }
}
