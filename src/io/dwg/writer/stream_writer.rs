//! Bit-level DWG stream writer.
//!
//! Mirrors the reader: bits are packed most-significant first and every
//! multi-byte value may start mid-byte. The buffer grows as needed; only
//! values with no wire form (over-long text) are refused.

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::types::{Color, DwgDateTime, DwgTimeSpan, DwgVersion, Handle, Vector2, Vector3};

/// Bit-level writer into a growable buffer.
pub struct DwgStreamWriter {
    buffer: Vec<u8>,
    bit_shift: u8,
    /// Pending partial byte, not yet pushed to `buffer`
    last_byte: u8,
    encoding: &'static Encoding,
    version: DwgVersion,
    saved_position_in_bits: u64,
}

impl DwgStreamWriter {
    pub fn new(version: DwgVersion) -> Self {
        Self {
            buffer: Vec::new(),
            bit_shift: 0,
            last_byte: 0,
            encoding: encoding_rs::WINDOWS_1252,
            version,
            saved_position_in_bits: 0,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    pub fn position_in_bits(&self) -> u64 {
        self.buffer.len() as u64 * 8 + self.bit_shift as u64
    }

    pub fn saved_position_in_bits(&self) -> u64 {
        self.saved_position_in_bits
    }

    /// Remember the current position and reserve an RL to patch later.
    pub fn save_position_for_size(&mut self) {
        self.saved_position_in_bits = self.position_in_bits();
        self.write_raw_long(0);
    }

    /// Pad the pending byte with zero bits and return the written data.
    pub fn finish(mut self) -> Vec<u8> {
        self.write_spear_shift();
        self.buffer
    }

    fn reset_shift(&mut self) {
        self.bit_shift = 0;
        self.last_byte = 0;
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn write_spear_shift(&mut self) {
        if self.bit_shift > 0 {
            self.buffer.push(self.last_byte);
            self.reset_shift();
        }
    }

    /// Overwrite an already written RL at `bit_position`.
    ///
    /// The 32 bits must lie entirely before the current position.
    pub fn patch_raw_long(&mut self, bit_position: u64, value: i32) {
        debug_assert!(bit_position + 32 <= self.position_in_bits());
        let bytes = value.to_le_bytes();
        for (i, byte) in bytes.iter().enumerate() {
            for bit in 0..8u64 {
                let set = (byte << bit) & 0x80 != 0;
                self.set_bit_at(bit_position + i as u64 * 8 + bit, set);
            }
        }
    }

    fn set_bit_at(&mut self, bit_position: u64, value: bool) {
        let index = (bit_position / 8) as usize;
        let mask = 0x80u8 >> (bit_position % 8);
        let target = if index < self.buffer.len() {
            &mut self.buffer[index]
        } else {
            &mut self.last_byte
        };
        if value {
            *target |= mask;
        } else {
            *target &= !mask;
        }
    }

    // ---------------------------------------------------------------
    // Raw writes
    // ---------------------------------------------------------------

    /// **RC**
    pub fn write_byte(&mut self, value: u8) {
        if self.bit_shift == 0 {
            self.buffer.push(value);
            return;
        }

        let shift = 8 - self.bit_shift;
        self.buffer.push(self.last_byte | (value >> self.bit_shift));
        self.last_byte = value << shift;
    }

    pub fn write_bytes(&mut self, arr: &[u8]) {
        for &b in arr {
            self.write_byte(b);
        }
    }

    /// **RS**
    pub fn write_raw_short(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// **RS** as unsigned
    pub fn write_raw_ushort(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// **RL**
    pub fn write_raw_long(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// **RD**
    pub fn write_raw_double(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// **2RD**
    pub fn write_2raw_double(&mut self, value: Vector2) {
        self.write_raw_double(value.x);
        self.write_raw_double(value.y);
    }

    // ---------------------------------------------------------------
    // Bit-coded writes
    // ---------------------------------------------------------------

    /// **B**
    pub fn write_bit(&mut self, value: bool) {
        if self.bit_shift < 7 {
            if value {
                self.last_byte |= 1 << (7 - self.bit_shift);
            }
            self.bit_shift += 1;
            return;
        }

        // bit_shift == 7: this is the last bit in the byte
        if value {
            self.last_byte |= 1;
        }
        self.buffer.push(self.last_byte);
        self.reset_shift();
    }

    /// **BB**
    pub fn write_2bits(&mut self, value: u8) {
        let value = value & 3;
        if self.bit_shift < 6 {
            self.last_byte |= value << (6 - self.bit_shift);
            self.bit_shift += 2;
        } else if self.bit_shift == 6 {
            self.last_byte |= value;
            self.buffer.push(self.last_byte);
            self.reset_shift();
        } else {
            // bit_shift == 7: spans byte boundary
            self.last_byte |= value >> 1;
            self.buffer.push(self.last_byte);
            self.last_byte = value << 7;
            self.bit_shift = 1;
        }
    }

    /// **BS**
    pub fn write_bit_short(&mut self, value: i16) {
        if value == 0 {
            self.write_2bits(2);
        } else if value > 0 && value < 256 {
            self.write_2bits(1);
            self.write_byte(value as u8);
        } else if value == 256 {
            self.write_2bits(3);
        } else {
            self.write_2bits(0);
            self.write_raw_short(value);
        }
    }

    /// **BL**
    pub fn write_bit_long(&mut self, value: i32) {
        if value == 0 {
            self.write_2bits(2);
        } else if value > 0 && value < 256 {
            self.write_2bits(1);
            self.write_byte(value as u8);
        } else {
            self.write_2bits(0);
            self.write_raw_long(value);
        }
    }

    /// **BD**
    pub fn write_bit_double(&mut self, value: f64) {
        // Compare bit patterns so -0.0 survives a round trip
        if value.to_bits() == 0.0f64.to_bits() {
            self.write_2bits(2);
        } else if value == 1.0 {
            self.write_2bits(1);
        } else {
            self.write_2bits(0);
            self.write_raw_double(value);
        }
    }

    /// **DD**
    pub fn write_bit_double_with_default(&mut self, def: f64, value: f64) {
        let def_bytes = def.to_le_bytes();
        let value_bytes = value.to_le_bytes();

        if def_bytes == value_bytes {
            // 00: No more data, use default.
            self.write_2bits(0);
            return;
        }

        // Count the matching high-order bytes
        let first = def_bytes
            .iter()
            .rev()
            .zip(value_bytes.iter().rev())
            .take_while(|(d, v)| d == v)
            .count();

        if first >= 4 {
            // 01: 4 bytes patched into first 4 bytes
            self.write_2bits(1);
            self.write_bytes(&value_bytes[..4]);
        } else if first >= 2 {
            // 10: 6 bytes, [4..6] then [0..4]
            self.write_2bits(2);
            self.write_byte(value_bytes[4]);
            self.write_byte(value_bytes[5]);
            self.write_bytes(&value_bytes[..4]);
        } else {
            // 11: Full RD
            self.write_2bits(3);
            self.write_bytes(&value_bytes);
        }
    }

    /// **3BD**
    pub fn write_3bit_double(&mut self, value: Vector3) {
        self.write_bit_double(value.x);
        self.write_bit_double(value.y);
        self.write_bit_double(value.z);
    }

    /// **MC**
    pub fn write_modular_char(&mut self, value: u64) {
        let mut value = value;
        loop {
            let group = (value & 0b0111_1111) as u8;
            value >>= 7;
            if value == 0 {
                self.write_byte(group);
                return;
            }
            self.write_byte(group | 0b1000_0000);
        }
    }

    /// Signed **MC**: sign in bit 6 of the last byte.
    pub fn write_signed_modular_char(&mut self, value: i64) {
        let negative = value < 0;
        let mut magnitude = value.unsigned_abs();
        loop {
            if magnitude < 0b0100_0000 {
                let mut last = magnitude as u8;
                if negative {
                    last |= 0b0100_0000;
                }
                self.write_byte(last);
                return;
            }
            self.write_byte((magnitude & 0b0111_1111) as u8 | 0b1000_0000);
            magnitude >>= 7;
        }
    }

    /// **MS**
    pub fn write_modular_short(&mut self, value: u32) {
        let mut value = value;
        loop {
            let group = (value & 0x7FFF) as u16;
            value >>= 15;
            if value == 0 {
                self.write_raw_ushort(group);
                return;
            }
            self.write_raw_ushort(group | 0x8000);
        }
    }

    /// **H**
    pub fn write_handle_reference(&mut self, reference: HandleReference) {
        let counter = reference.counter();
        self.write_byte(((reference.code as u8) << 4) | counter);

        if matches!(reference.code, DwgReferenceType::PlusOne | DwgReferenceType::MinusOne) {
            return;
        }

        // Handle bytes in big-endian order
        for i in (0..counter as u32).rev() {
            self.write_byte((reference.value >> (i * 8)) as u8);
        }
    }

    /// **TV**
    ///
    /// The BS length limits the encoded text to `i16::MAX` bytes.
    pub fn write_variable_text(&mut self, value: &str) -> Result<()> {
        if value.is_empty() {
            self.write_bit_short(0);
            return Ok(());
        }

        let (encoded, _, _) = self.encoding.encode(value);
        let length = i16::try_from(encoded.len()).map_err(|_| {
            DwgError::malformed(
                Handle::NULL,
                format!("text of {} bytes does not fit a TV length", encoded.len()),
            )
        })?;
        self.write_bit_short(length);
        self.write_bytes(&encoded);
        Ok(())
    }

    /// **CMC**
    pub fn write_cm_color(&mut self, value: Color) {
        self.write_bit_short(value.index());
    }

    /// **BE**
    pub fn write_bit_extrusion(&mut self, normal: Vector3) {
        if self.version >= DwgVersion::AC1015 {
            if normal == Vector3::UNIT_Z {
                self.write_bit(true);
            } else {
                self.write_bit(false);
                self.write_3bit_double(normal);
            }
        } else {
            self.write_3bit_double(normal);
        }
    }

    /// **BT**
    pub fn write_bit_thickness(&mut self, thickness: f64) {
        if self.version >= DwgVersion::AC1015 {
            if thickness.to_bits() == 0.0f64.to_bits() {
                self.write_bit(true);
            } else {
                self.write_bit(false);
                self.write_bit_double(thickness);
            }
        } else {
            self.write_bit_double(thickness);
        }
    }

    pub fn write_date_time(&mut self, value: DwgDateTime) {
        self.write_bit_long(value.julian_day);
        self.write_bit_long(value.milliseconds);
    }

    pub fn write_time_span(&mut self, value: DwgTimeSpan) {
        self.write_bit_long(value.days);
        self.write_bit_long(value.milliseconds);
    }
}

/// Overwrite 32 bits at `bit_position` of a finished buffer with an RL.
pub fn overwrite_raw_long(buffer: &mut [u8], bit_position: u64, value: i32) {
    let bytes = value.to_le_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        for bit in 0..8u64 {
            let pos = bit_position + i as u64 * 8 + bit;
            let mask = 0x80u8 >> (pos % 8);
            if let Some(target) = buffer.get_mut((pos / 8) as usize) {
                if (byte << bit) & 0x80 != 0 {
                    *target |= mask;
                } else {
                    *target &= !mask;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::reader::DwgStreamReader;

    fn written(f: impl FnOnce(&mut DwgStreamWriter)) -> Vec<u8> {
        let mut w = DwgStreamWriter::new(DwgVersion::AC1015);
        f(&mut w);
        w.finish()
    }

    #[test]
    fn test_golden_vectors() {
        assert_eq!(written(|w| w.write_bit(true)), vec![0x80]);
        assert_eq!(written(|w| w.write_bit_short(0)), vec![0x80]);
        assert_eq!(written(|w| w.write_bit_short(256)), vec![0xC0]);
        assert_eq!(written(|w| w.write_bit_short(42)), vec![0x4A, 0x80]);
        assert_eq!(written(|w| w.write_bit_long(0)), vec![0x80]);
        assert_eq!(written(|w| w.write_bit_double(1.0)), vec![0x40]);
        assert_eq!(written(|w| w.write_bit_double(0.0)), vec![0x80]);
        assert_eq!(
            written(|w| w.write_handle_reference(HandleReference::new(
                DwgReferenceType::SoftOwner,
                0x1A
            ))),
            vec![0x21, 0x1A]
        );
        assert_eq!(written(|w| w.write_modular_char(300)), vec![0xAC, 0x02]);
        assert_eq!(written(|w| w.write_modular_short(300)), vec![0x2C, 0x01]);
    }

    #[test]
    fn test_golden_extremes() {
        assert_eq!(written(|w| w.write_bit_short(i16::MAX)), vec![0x3F, 0xDF, 0xC0]);
        assert_eq!(written(|w| w.write_bit_short(i16::MIN)), vec![0x00, 0x20, 0x00]);
        assert_eq!(written(|w| w.write_bit_short(255)), vec![0x7F, 0xC0]);
        assert_eq!(
            written(|w| w.write_bit_long(i32::MAX)),
            vec![0x3F, 0xFF, 0xFF, 0xDF, 0xC0]
        );
        assert_eq!(
            written(|w| w.write_bit_long(i32::MIN)),
            vec![0x00, 0x00, 0x00, 0x20, 0x00]
        );
        assert_eq!(written(|w| w.write_raw_short(i16::MIN)), vec![0x00, 0x80]);
        assert_eq!(written(|w| w.write_raw_short(i16::MAX)), vec![0xFF, 0x7F]);
        assert_eq!(written(|w| w.write_raw_long(i32::MIN)), vec![0x00, 0x00, 0x00, 0x80]);
        assert_eq!(written(|w| w.write_raw_long(-1)), vec![0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_golden_doubles() {
        // 1.5 is 0x3FF8000000000000, behind the 00 tag
        assert_eq!(
            written(|w| w.write_bit_double(1.5)),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3E, 0x0F, 0xC0]
        );
        // -2.75 is 0xC006000000000000
        assert_eq!(
            written(|w| w.write_bit_double(-2.75)),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xB0, 0x00]
        );
        assert_eq!(
            written(|w| w.write_raw_double(-2.75)),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0xC0]
        );
    }

    #[test]
    fn test_golden_modular() {
        assert_eq!(written(|w| w.write_signed_modular_char(-1)), vec![0x41]);
        assert_eq!(written(|w| w.write_signed_modular_char(-64)), vec![0xC0, 0x40]);
        assert_eq!(written(|w| w.write_signed_modular_char(-300)), vec![0xAC, 0x42]);
        assert_eq!(written(|w| w.write_signed_modular_char(300)), vec![0xAC, 0x02]);
        assert_eq!(written(|w| w.write_modular_short(32768)), vec![0x00, 0x80, 0x01, 0x00]);
    }

    #[test]
    fn test_write_2bits_across_boundary() {
        let data = written(|w| {
            for _ in 0..7 {
                w.write_bit(false);
            }
            w.write_2bits(3);
        });
        assert_eq!(data, vec![0x01, 0x80]);
    }

    #[test]
    fn test_bit_short_negative_uses_raw_short() {
        let data = written(|w| w.write_bit_short(-1));
        // 00 then 0xFFFF shifted right by two bits
        assert_eq!(data, vec![0x3F, 0xFF, 0xC0]);
        let mut r = DwgStreamReader::new(&data, DwgVersion::AC1015);
        assert_eq!(r.read_bit_short().unwrap(), -1);
    }

    #[test]
    fn test_signed_modular_char() {
        assert_eq!(written(|w| w.write_signed_modular_char(-5)), vec![0x45]);
        assert_eq!(written(|w| w.write_signed_modular_char(63)), vec![0x3F]);
        assert_eq!(written(|w| w.write_signed_modular_char(-300)), vec![0xAC, 0x42]);
    }

    #[test]
    fn test_bit_double_with_default_patches() {
        let def = 10.0f64;
        let value = f64::from_bits(def.to_bits() ^ 0x1234);
        let data = written(|w| w.write_bit_double_with_default(def, value));
        // 01 then four patch bytes
        assert_eq!(data.len(), 5);
        let mut r = DwgStreamReader::new(&data, DwgVersion::AC1015);
        assert_eq!(r.read_bit_double_with_default(def).unwrap(), value);

        let data = written(|w| w.write_bit_double_with_default(def, def));
        assert_eq!(data, vec![0x00]);
    }

    #[test]
    fn test_patch_raw_long_mid_byte() {
        let mut w = DwgStreamWriter::new(DwgVersion::AC1015);
        w.write_bit(true);
        let at = w.position_in_bits();
        w.write_raw_long(0);
        w.write_bit(true);
        w.patch_raw_long(at, 0x1234_5678);
        let data = w.finish();

        let mut r = DwgStreamReader::new(&data, DwgVersion::AC1015);
        assert!(r.read_bit().unwrap());
        assert_eq!(r.read_raw_long().unwrap(), 0x1234_5678);
        assert!(r.read_bit().unwrap());
    }

    #[test]
    fn test_overwrite_raw_long_in_finished_buffer() {
        let mut data = written(|w| {
            w.write_2bits(1);
            w.write_raw_long(-1);
        });
        overwrite_raw_long(&mut data, 2, 77);
        let mut r = DwgStreamReader::new(&data, DwgVersion::AC1015);
        assert_eq!(r.read_2bits().unwrap(), 1);
        assert_eq!(r.read_raw_long().unwrap(), 77);
    }

    #[test]
    fn test_extrusion_and_thickness_r2000_flags() {
        assert_eq!(written(|w| w.write_bit_extrusion(Vector3::UNIT_Z)), vec![0x80]);
        assert_eq!(written(|w| w.write_bit_thickness(0.0)), vec![0x80]);
        let mut w = DwgStreamWriter::new(DwgVersion::AC1012);
        w.write_bit_thickness(0.0);
        assert_eq!(w.position_in_bits(), 2);
    }

    #[test]
    fn test_variable_text_code_page() {
        let data = written(|w| w.write_variable_text("Caf\u{e9}").unwrap());
        let mut r = DwgStreamReader::new(&data, DwgVersion::AC1015);
        assert_eq!(r.read_variable_text().unwrap(), "Caf\u{e9}");
    }

    #[test]
    fn test_variable_text_too_long() {
        let mut w = DwgStreamWriter::new(DwgVersion::AC1015);
        w.write_variable_text(&"x".repeat(i16::MAX as usize)).unwrap();
        let longest = w.position_in_bits();

        let err = w.write_variable_text(&"x".repeat(i16::MAX as usize + 1)).unwrap_err();
        assert!(matches!(err, DwgError::MalformedDocument { .. }), "{:?}", err);
        assert_eq!(w.position_in_bits(), longest);
    }
}
