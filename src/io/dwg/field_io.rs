//! Direction-agnostic field codec.
//!
//! Every object type and the header-variables block describe their wire
//! layout once, as a sequence of calls on a [`FieldIo`]. The reader fills the
//! passed fields from the stream; the writer emits them unchanged. Field
//! order and version conditions are therefore shared by both directions.

use crate::error::{DwgError, Result};
use crate::io::dwg::reader::DwgStreamReader;
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::io::dwg::section_io::SectionIO;
use crate::io::dwg::writer::DwgStreamWriter;
use crate::types::{Color, DwgDateTime, DwgTimeSpan, DwgVersion, Handle, Vector2, Vector3};

/// A visitor over the primitive codec, implemented by the bit reader and
/// the bit writer.
pub trait FieldIo {
    fn is_reading(&self) -> bool;
    fn version(&self) -> DwgVersion;

    fn sio(&self) -> SectionIO {
        SectionIO::new(self.version())
    }

    /// **B**
    fn bit(&mut self, value: &mut bool) -> Result<()>;
    /// **BB**
    fn bits2(&mut self, value: &mut u8) -> Result<()>;
    /// **BS**
    fn bit_short(&mut self, value: &mut i16) -> Result<()>;
    /// **BL**
    fn bit_long(&mut self, value: &mut i32) -> Result<()>;
    /// **BD**
    fn bit_double(&mut self, value: &mut f64) -> Result<()>;
    /// **DD**
    fn bit_double_default(&mut self, value: &mut f64, default: f64) -> Result<()>;
    /// **RC**
    fn raw_char(&mut self, value: &mut u8) -> Result<()>;
    /// **RS**
    fn raw_short(&mut self, value: &mut i16) -> Result<()>;
    /// **RL**
    fn raw_long(&mut self, value: &mut i32) -> Result<()>;
    /// **RD**
    fn raw_double(&mut self, value: &mut f64) -> Result<()>;
    /// **H**
    fn handle(&mut self, value: &mut HandleReference) -> Result<()>;
    /// **TV**
    fn text(&mut self, value: &mut String) -> Result<()>;
    /// `length` raw bytes
    fn raw_bytes(&mut self, value: &mut Vec<u8>, length: usize) -> Result<()>;
    /// **CMC**
    fn color(&mut self, value: &mut Color) -> Result<()>;
    /// **3BD**
    fn point3(&mut self, value: &mut Vector3) -> Result<()>;
    /// **2RD**
    fn point2_raw(&mut self, value: &mut Vector2) -> Result<()>;
    /// **BT**
    fn thickness(&mut self, value: &mut f64) -> Result<()>;
    /// **BE**
    fn extrusion(&mut self, value: &mut Vector3) -> Result<()>;
    fn date_time(&mut self, value: &mut DwgDateTime) -> Result<()>;
    fn time_span(&mut self, value: &mut DwgTimeSpan) -> Result<()>;

    /// RL holding the bit offset of the handle section.
    ///
    /// The writer reserves the slot; [`FieldIo::enter_handle_section`]
    /// fills it in.
    fn handle_section_offset(&mut self, value: &mut u32) -> Result<()>;

    /// Boundary between the data fields and the handle references.
    ///
    /// The reader checks that the cursor sits exactly at `recorded`.
    fn enter_handle_section(&mut self, recorded: u32, owner: Handle) -> Result<()>;

    /// **RC** stored in a wider signed field.
    fn raw_char_short(&mut self, value: &mut i16) -> Result<()> {
        let mut b = *value as u8;
        self.raw_char(&mut b)?;
        if self.is_reading() {
            *value = b as i16;
        }
        Ok(())
    }

    /// **BS** stored in a flag-sized field.
    fn bit_short_u16(&mut self, value: &mut u16) -> Result<()> {
        let mut s = *value as i16;
        self.bit_short(&mut s)?;
        if self.is_reading() {
            *value = s as u16;
        }
        Ok(())
    }

    /// An absolute handle written with a fixed reference code.
    fn absolute_handle(&mut self, value: &mut Handle, code: DwgReferenceType) -> Result<()> {
        let mut reference = HandleReference::to_handle(code, *value);
        self.handle(&mut reference)?;
        if self.is_reading() {
            *value = Handle::new(reference.value);
        }
        Ok(())
    }

    /// A count-prefixed run of records. `count` is only consulted when
    /// reading; the writer emits every item.
    ///
    /// Items are decoded one at a time, so a count larger than the record
    /// can hold ends in `CorruptStream` once the bits run out.
    fn repeated<T, C>(&mut self, items: &mut Vec<T>, count: usize, mut codec: C) -> Result<()>
    where
        Self: Sized,
        T: Default,
        C: FnMut(&mut Self, &mut T) -> Result<()>,
    {
        if self.is_reading() {
            items.clear();
            for _ in 0..count {
                let mut item = T::default();
                codec(self, &mut item)?;
                items.push(item);
            }
            return Ok(());
        }
        for item in items.iter_mut() {
            codec(self, item)?;
        }
        Ok(())
    }
}

/// Converts a stored count to its wire value, failing on overflow.
pub fn wire_count<T: TryFrom<usize>>(len: usize, owner: Handle, what: &str) -> Result<T> {
    T::try_from(len).map_err(|_| DwgError::malformed(owner, format!("too many {}: {}", what, len)))
}

/// Converts a count read from the stream to a length.
pub fn read_count(value: i64, owner: Handle, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| DwgError::malformed(owner, format!("negative {} count {}", what, value)))
}

impl FieldIo for DwgStreamReader<'_> {
    fn is_reading(&self) -> bool {
        true
    }

    fn version(&self) -> DwgVersion {
        DwgStreamReader::version(self)
    }

    fn bit(&mut self, value: &mut bool) -> Result<()> {
        *value = self.read_bit()?;
        Ok(())
    }

    fn bits2(&mut self, value: &mut u8) -> Result<()> {
        *value = self.read_2bits()?;
        Ok(())
    }

    fn bit_short(&mut self, value: &mut i16) -> Result<()> {
        *value = self.read_bit_short()?;
        Ok(())
    }

    fn bit_long(&mut self, value: &mut i32) -> Result<()> {
        *value = self.read_bit_long()?;
        Ok(())
    }

    fn bit_double(&mut self, value: &mut f64) -> Result<()> {
        *value = self.read_bit_double()?;
        Ok(())
    }

    fn bit_double_default(&mut self, value: &mut f64, default: f64) -> Result<()> {
        *value = self.read_bit_double_with_default(default)?;
        Ok(())
    }

    fn raw_char(&mut self, value: &mut u8) -> Result<()> {
        *value = self.read_byte()?;
        Ok(())
    }

    fn raw_short(&mut self, value: &mut i16) -> Result<()> {
        *value = self.read_raw_short()?;
        Ok(())
    }

    fn raw_long(&mut self, value: &mut i32) -> Result<()> {
        *value = self.read_raw_long()?;
        Ok(())
    }

    fn raw_double(&mut self, value: &mut f64) -> Result<()> {
        *value = self.read_raw_double()?;
        Ok(())
    }

    fn handle(&mut self, value: &mut HandleReference) -> Result<()> {
        *value = self.read_handle_reference()?;
        Ok(())
    }

    fn text(&mut self, value: &mut String) -> Result<()> {
        *value = self.read_variable_text()?;
        Ok(())
    }

    fn raw_bytes(&mut self, value: &mut Vec<u8>, length: usize) -> Result<()> {
        *value = self.read_bytes(length)?;
        Ok(())
    }

    fn color(&mut self, value: &mut Color) -> Result<()> {
        *value = self.read_cm_color()?;
        Ok(())
    }

    fn point3(&mut self, value: &mut Vector3) -> Result<()> {
        *value = self.read_3bit_double()?;
        Ok(())
    }

    fn point2_raw(&mut self, value: &mut Vector2) -> Result<()> {
        *value = self.read_2raw_double()?;
        Ok(())
    }

    fn thickness(&mut self, value: &mut f64) -> Result<()> {
        *value = self.read_bit_thickness()?;
        Ok(())
    }

    fn extrusion(&mut self, value: &mut Vector3) -> Result<()> {
        *value = self.read_bit_extrusion()?;
        Ok(())
    }

    fn date_time(&mut self, value: &mut DwgDateTime) -> Result<()> {
        *value = self.read_date_time()?;
        Ok(())
    }

    fn time_span(&mut self, value: &mut DwgTimeSpan) -> Result<()> {
        *value = self.read_time_span()?;
        Ok(())
    }

    fn handle_section_offset(&mut self, value: &mut u32) -> Result<()> {
        *value = self.read_raw_long()? as u32;
        Ok(())
    }

    fn enter_handle_section(&mut self, recorded: u32, owner: Handle) -> Result<()> {
        let actual = self.position_in_bits();
        if actual != recorded as u64 {
            return Err(DwgError::malformed(
                owner,
                format!(
                    "handle section expected at bit {}, data ended at bit {}",
                    recorded, actual
                ),
            ));
        }
        Ok(())
    }
}

impl FieldIo for DwgStreamWriter {
    fn is_reading(&self) -> bool {
        false
    }

    fn version(&self) -> DwgVersion {
        DwgStreamWriter::version(self)
    }

    fn bit(&mut self, value: &mut bool) -> Result<()> {
        self.write_bit(*value);
        Ok(())
    }

    fn bits2(&mut self, value: &mut u8) -> Result<()> {
        self.write_2bits(*value);
        Ok(())
    }

    fn bit_short(&mut self, value: &mut i16) -> Result<()> {
        self.write_bit_short(*value);
        Ok(())
    }

    fn bit_long(&mut self, value: &mut i32) -> Result<()> {
        self.write_bit_long(*value);
        Ok(())
    }

    fn bit_double(&mut self, value: &mut f64) -> Result<()> {
        self.write_bit_double(*value);
        Ok(())
    }

    fn bit_double_default(&mut self, value: &mut f64, default: f64) -> Result<()> {
        self.write_bit_double_with_default(default, *value);
        Ok(())
    }

    fn raw_char(&mut self, value: &mut u8) -> Result<()> {
        self.write_byte(*value);
        Ok(())
    }

    fn raw_short(&mut self, value: &mut i16) -> Result<()> {
        self.write_raw_short(*value);
        Ok(())
    }

    fn raw_long(&mut self, value: &mut i32) -> Result<()> {
        self.write_raw_long(*value);
        Ok(())
    }

    fn raw_double(&mut self, value: &mut f64) -> Result<()> {
        self.write_raw_double(*value);
        Ok(())
    }

    fn handle(&mut self, value: &mut HandleReference) -> Result<()> {
        self.write_handle_reference(*value);
        Ok(())
    }

    fn text(&mut self, value: &mut String) -> Result<()> {
        self.write_variable_text(value)
    }

    fn raw_bytes(&mut self, value: &mut Vec<u8>, length: usize) -> Result<()> {
        debug_assert_eq!(value.len(), length);
        self.write_bytes(value);
        Ok(())
    }

    fn color(&mut self, value: &mut Color) -> Result<()> {
        self.write_cm_color(*value);
        Ok(())
    }

    fn point3(&mut self, value: &mut Vector3) -> Result<()> {
        self.write_3bit_double(*value);
        Ok(())
    }

    fn point2_raw(&mut self, value: &mut Vector2) -> Result<()> {
        self.write_2raw_double(*value);
        Ok(())
    }

    fn thickness(&mut self, value: &mut f64) -> Result<()> {
        self.write_bit_thickness(*value);
        Ok(())
    }

    fn extrusion(&mut self, value: &mut Vector3) -> Result<()> {
        self.write_bit_extrusion(*value);
        Ok(())
    }

    fn date_time(&mut self, value: &mut DwgDateTime) -> Result<()> {
        self.write_date_time(*value);
        Ok(())
    }

    fn time_span(&mut self, value: &mut DwgTimeSpan) -> Result<()> {
        self.write_time_span(*value);
        Ok(())
    }

    fn handle_section_offset(&mut self, _value: &mut u32) -> Result<()> {
        self.save_position_for_size();
        Ok(())
    }

    fn enter_handle_section(&mut self, _recorded: u32, owner: Handle) -> Result<()> {
        let position = self.position_in_bits();
        let value = wire_count::<i32>(position as usize, owner, "data bits")?;
        let saved = self.saved_position_in_bits();
        self.patch_raw_long(saved, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        flag: bool,
        count: i16,
        scale: f64,
        name: String,
        owner: HandleReference,
        offsets: Vec<i32>,
    }

    impl Sample {
        fn visit<F: FieldIo>(&mut self, io: &mut F) -> Result<()> {
            io.bit(&mut self.flag)?;
            let mut n = self.offsets.len() as i16;
            io.bit_short(&mut n)?;
            self.count = n;
            io.bit_double(&mut self.scale)?;
            io.text(&mut self.name)?;
            io.handle(&mut self.owner)?;
            io.repeated(&mut self.offsets, n as usize, |io, v| io.bit_long(v))
        }
    }

    #[test]
    fn test_visit_is_symmetric() {
        let mut original = Sample {
            flag: true,
            count: 3,
            scale: 2.5,
            name: "ABC".to_string(),
            owner: HandleReference::new(DwgReferenceType::HardPointer, 0x42),
            offsets: vec![0, 7, -9],
        };
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        original.visit(&mut writer).unwrap();
        let bytes = writer.finish();

        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        let mut parsed = Sample::default();
        parsed.visit(&mut reader).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_handle_section_marker() {
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1015);
        let mut slot = 0u32;
        writer.handle_section_offset(&mut slot).unwrap();
        writer.write_bit(true);
        writer.enter_handle_section(0, Handle::new(1)).unwrap();
        let bytes = writer.finish();

        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        reader.handle_section_offset(&mut slot).unwrap();
        assert_eq!(slot, 33);
        assert!(reader.read_bit().unwrap());
        reader.enter_handle_section(slot, Handle::new(1)).unwrap();

        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1015);
        reader.handle_section_offset(&mut slot).unwrap();
        let err = reader.enter_handle_section(slot, Handle::new(1)).unwrap_err();
        assert!(matches!(err, DwgError::MalformedDocument { .. }));
    }

    #[test]
    fn test_absolute_handle_keeps_value() {
        let mut value = Handle::new(0x1F);
        let mut writer = DwgStreamWriter::new(DwgVersion::AC1014);
        writer
            .absolute_handle(&mut value, DwgReferenceType::HardOwner)
            .unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0x31, 0x1F]);

        let mut read = Handle::NULL;
        let mut reader = DwgStreamReader::new(&bytes, DwgVersion::AC1014);
        reader
            .absolute_handle(&mut read, DwgReferenceType::HardOwner)
            .unwrap();
        assert_eq!(read, value);
    }
}
