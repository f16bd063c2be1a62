//! Bit-level DWG stream reader.
//!
//! DWG data is **bit-aligned** (not byte-aligned). Every read tracks the
//! current bit position within the byte buffer; a read past the last
//! available bit fails with [`DwgError::CorruptStream`].
//!
//! - **B** bit, **BB** 2-bit code
//! - **BS** BitShort, **BL** BitLong, **BD** BitDouble, **DD** BitDouble with default
//! - **MC** Modular Char, **MS** Modular Short
//! - **H** Handle reference
//! - **TV** Variable text
//! - **RC**, **RS**, **RL**, **RD** raw values
//! - **BE** BitExtrusion, **BT** BitThickness, **CMC** color

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::io::dwg::reference_type::{DwgReferenceType, HandleReference};
use crate::types::{Color, DwgDateTime, DwgTimeSpan, DwgVersion, Vector2, Vector3};

/// Bit cursor over a borrowed byte buffer.
pub struct DwgStreamReader<'a> {
    data: &'a [u8],
    /// Index of the next byte to load
    position: usize,
    bit_shift: u8,
    last_byte: u8,
    encoding: &'static Encoding,
    version: DwgVersion,
}

impl<'a> DwgStreamReader<'a> {
    pub fn new(data: &'a [u8], version: DwgVersion) -> Self {
        Self {
            data,
            position: 0,
            bit_shift: 0,
            last_byte: 0,
            encoding: encoding_rs::WINDOWS_1252,
            version,
        }
    }

    /// Create a reader positioned at a byte offset.
    pub fn new_at(data: &'a [u8], version: DwgVersion, position: usize) -> Self {
        let mut reader = Self::new(data, version);
        reader.set_position(position);
        reader
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Current byte position; a partially consumed byte counts as consumed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Set the byte position (resets bit shift to 0).
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
        self.bit_shift = 0;
        self.last_byte = 0;
    }

    pub fn position_in_bits(&self) -> u64 {
        let bit_position = self.position as u64 * 8;
        if self.bit_shift > 0 {
            bit_position + self.bit_shift as u64 - 8
        } else {
            bit_position
        }
    }

    pub fn set_position_in_bits(&mut self, position: u64) -> Result<()> {
        self.set_position((position >> 3) as usize);
        self.bit_shift = (position & 7) as u8;

        if self.bit_shift > 0 {
            self.advance_byte()?;
        }
        Ok(())
    }

    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() as u64 * 8).saturating_sub(self.position_in_bits())
    }

    /// Skip to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.bit_shift = 0;
    }

    fn advance_byte(&mut self) -> Result<()> {
        match self.data.get(self.position) {
            Some(&b) => {
                self.last_byte = b;
                self.position += 1;
                Ok(())
            }
            None => Err(DwgError::corrupt(
                self.position_in_bits(),
                "read past end of stream",
            )),
        }
    }

    fn ensure_bits(&self, bits: u64) -> Result<()> {
        if self.remaining_bits() < bits {
            return Err(DwgError::corrupt(
                self.position_in_bits(),
                format!("{} bits requested, {} available", bits, self.remaining_bits()),
            ));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // BIT CODES AND DATA DEFINITIONS
    // ---------------------------------------------------------------

    /// **B**
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            let result = (self.last_byte & 128) == 128;
            self.bit_shift = 1;
            return Ok(result);
        }

        let value = ((self.last_byte << self.bit_shift) & 128) == 128;

        self.bit_shift += 1;
        self.bit_shift &= 7;

        Ok(value)
    }

    /// **BB**
    pub fn read_2bits(&mut self) -> Result<u8> {
        let value;
        if self.bit_shift == 0 {
            self.advance_byte()?;
            value = self.last_byte >> 6;
            self.bit_shift = 2;
        } else if self.bit_shift == 7 {
            let last_value = (self.last_byte << 1) & 2;
            self.advance_byte()?;
            value = last_value | (self.last_byte >> 7);
            self.bit_shift = 1;
        } else {
            value = (self.last_byte >> (6 - self.bit_shift)) & 3;
            self.bit_shift += 2;
            self.bit_shift &= 7;
        }
        Ok(value)
    }

    /// **RC**
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bit_shift == 0 {
            self.advance_byte()?;
            return Ok(self.last_byte);
        }

        // Get the last bits from the last read byte
        let last_values = self.last_byte << self.bit_shift;
        self.advance_byte()?;
        Ok(last_values | (self.last_byte >> (8 - self.bit_shift)))
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        self.ensure_bits(length as u64 * 8)?;
        let mut arr = Vec::with_capacity(length);
        for _ in 0..length {
            arr.push(self.read_byte()?);
        }
        Ok(arr)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure_bits(N as u64 * 8)?;
        let mut arr = [0u8; N];
        for b in arr.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(arr)
    }

    /// **RS**
    pub fn read_raw_short(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// **RS** as unsigned
    pub fn read_raw_ushort(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// **RL**
    pub fn read_raw_long(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// **RD**
    pub fn read_raw_double(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// **2RD**
    pub fn read_2raw_double(&mut self) -> Result<Vector2> {
        let x = self.read_raw_double()?;
        let y = self.read_raw_double()?;
        Ok(Vector2::new(x, y))
    }

    /// **BS**
    pub fn read_bit_short(&mut self) -> Result<i16> {
        match self.read_2bits()? {
            // 00: A short (2 bytes) follows, little-endian order (LSB first)
            0 => self.read_raw_short(),
            // 01: An unsigned char (1 byte) follows
            1 => Ok(self.read_byte()? as i16),
            // 10: 0
            2 => Ok(0),
            // 11: 256
            _ => Ok(256),
        }
    }

    /// **BL**
    pub fn read_bit_long(&mut self) -> Result<i32> {
        let start = self.position_in_bits();
        match self.read_2bits()? {
            0 => self.read_raw_long(),
            1 => Ok(self.read_byte()? as i32),
            2 => Ok(0),
            _ => Err(DwgError::corrupt(start, "invalid BitLong code 11")),
        }
    }

    /// **BD**
    pub fn read_bit_double(&mut self) -> Result<f64> {
        let start = self.position_in_bits();
        match self.read_2bits()? {
            0 => self.read_raw_double(),
            1 => Ok(1.0),
            2 => Ok(0.0),
            _ => Err(DwgError::corrupt(start, "invalid BitDouble code 11")),
        }
    }

    /// **DD**
    pub fn read_bit_double_with_default(&mut self, def: f64) -> Result<f64> {
        let mut arr = def.to_le_bytes();

        match self.read_2bits()? {
            // 00: No more data present, use default.
            0 => Ok(def),
            // 01: 4 bytes patched into first 4 bytes of default
            1 => {
                let patch: [u8; 4] = self.read_array()?;
                arr[..4].copy_from_slice(&patch);
                Ok(f64::from_le_bytes(arr))
            }
            // 10: 6 bytes, the first 2 patch bytes [4..6], the last 4 patch bytes [0..4]
            2 => {
                let patch: [u8; 6] = self.read_array()?;
                arr[4] = patch[0];
                arr[5] = patch[1];
                arr[..4].copy_from_slice(&patch[2..]);
                Ok(f64::from_le_bytes(arr))
            }
            // 11: A full RD follows
            _ => self.read_raw_double(),
        }
    }

    /// **3BD**
    pub fn read_3bit_double(&mut self) -> Result<Vector3> {
        let x = self.read_bit_double()?;
        let y = self.read_bit_double()?;
        let z = self.read_bit_double()?;
        Ok(Vector3::new(x, y, z))
    }

    /// **MC**
    pub fn read_modular_char(&mut self) -> Result<u64> {
        let mut shift = 0u32;
        let mut value = 0u64;

        loop {
            let b = self.read_byte()?;
            if shift > 63 {
                return Err(DwgError::corrupt(
                    self.position_in_bits(),
                    "modular char too long",
                ));
            }
            value |= ((b & 0b0111_1111) as u64) << shift;
            if (b & 0b1000_0000) == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Signed **MC**: the last byte carries the sign in bit 6.
    pub fn read_signed_modular_char(&mut self) -> Result<i64> {
        let mut shift = 0u32;
        let mut sum = 0i64;

        loop {
            let b = self.read_byte()?;
            if shift > 62 {
                return Err(DwgError::corrupt(
                    self.position_in_bits(),
                    "modular char too long",
                ));
            }
            if (b & 0b1000_0000) != 0 {
                sum |= ((b & 0b0111_1111) as i64) << shift;
                shift += 7;
                continue;
            }

            // Last byte: drop the flags and add the value
            let value = sum | (((b & 0b0011_1111) as i64) << shift);
            return Ok(if (b & 0b0100_0000) != 0 { -value } else { value });
        }
    }

    /// **MS**
    pub fn read_modular_short(&mut self) -> Result<u32> {
        let mut shift = 0u32;
        let mut value = 0u32;

        loop {
            let word = self.read_raw_ushort()?;
            if shift > 30 {
                return Err(DwgError::corrupt(
                    self.position_in_bits(),
                    "modular short too long",
                ));
            }
            value |= ((word & 0x7FFF) as u32) << shift;
            if (word & 0x8000) == 0 {
                return Ok(value);
            }
            shift += 15;
        }
    }

    /// **H**: `|CODE (4 bits)|COUNTER (4 bits)|HANDLE or OFFSET|`
    pub fn read_handle_reference(&mut self) -> Result<HandleReference> {
        let start = self.position_in_bits();
        let form = self.read_byte()?;

        let code = form >> 4;
        let counter = (form & 0b0000_1111) as usize;
        if counter > 8 {
            return Err(DwgError::corrupt(
                start,
                format!("handle counter {} exceeds 8 bytes", counter),
            ));
        }

        let reference = DwgReferenceType::from_code(code).ok_or_else(|| {
            DwgError::corrupt(start, format!("invalid reference code {:#X}", code))
        })?;

        // Magnitude bytes are big-endian
        let mut value = 0u64;
        for _ in 0..counter {
            value = (value << 8) | self.read_byte()? as u64;
        }

        if matches!(reference, DwgReferenceType::PlusOne | DwgReferenceType::MinusOne) {
            value = 0;
        }

        Ok(HandleReference::new(reference, value))
    }

    /// **TV**
    pub fn read_variable_text(&mut self) -> Result<String> {
        let start = self.position_in_bits();
        let length = self.read_bit_short()?;
        if length < 0 {
            return Err(DwgError::corrupt(start, format!("negative text length {}", length)));
        }
        if length == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(length as usize)?;
        let (s, _, _) = self.encoding.decode(&bytes);
        Ok(s.replace('\0', ""))
    }

    /// **SN**
    pub fn read_sentinel(&mut self) -> Result<[u8; 16]> {
        self.read_array()
    }

    /// **CMC**: a BitShort color index up to R2000.
    pub fn read_cm_color(&mut self) -> Result<Color> {
        Ok(Color(self.read_bit_short()?))
    }

    /// **BE**
    pub fn read_bit_extrusion(&mut self) -> Result<Vector3> {
        if self.version >= DwgVersion::AC1015 {
            // 1-bit flag; if set the extrusion is (0,0,1)
            if self.read_bit()? {
                Ok(Vector3::UNIT_Z)
            } else {
                self.read_3bit_double()
            }
        } else {
            self.read_3bit_double()
        }
    }

    /// **BT**
    pub fn read_bit_thickness(&mut self) -> Result<f64> {
        if self.version >= DwgVersion::AC1015 {
            // 1-bit flag; if set the thickness is 0.0
            if self.read_bit()? {
                Ok(0.0)
            } else {
                self.read_bit_double()
            }
        } else {
            self.read_bit_double()
        }
    }

    pub fn read_date_time(&mut self) -> Result<DwgDateTime> {
        let julian_day = self.read_bit_long()?;
        let milliseconds = self.read_bit_long()?;
        Ok(DwgDateTime::new(julian_day, milliseconds))
    }

    pub fn read_time_span(&mut self) -> Result<DwgTimeSpan> {
        let days = self.read_bit_long()?;
        let milliseconds = self.read_bit_long()?;
        Ok(DwgTimeSpan::new(days, milliseconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &[u8]) -> DwgStreamReader<'_> {
        DwgStreamReader::new(data, DwgVersion::AC1015)
    }

    #[test]
    fn test_read_bits() {
        let data = [0b1010_0000];
        let mut r = reader(&data);
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        assert_eq!(r.position_in_bits(), 3);
    }

    #[test]
    fn test_read_2bits_across_boundary() {
        // bit 7 of the first byte and bit 0 of the second
        let data = [0b0000_0001, 0b0000_0000];
        let mut r = reader(&data);
        for _ in 0..7 {
            r.read_bit().unwrap();
        }
        assert_eq!(r.read_2bits().unwrap(), 0b10);
        assert_eq!(r.position_in_bits(), 9);
    }

    #[test]
    fn test_read_bit_short_golden() {
        assert_eq!(reader(&[0x80]).read_bit_short().unwrap(), 0);
        assert_eq!(reader(&[0xC0]).read_bit_short().unwrap(), 256);
        assert_eq!(reader(&[0x4A, 0x80]).read_bit_short().unwrap(), 42);
    }

    #[test]
    fn test_read_bit_double_golden() {
        assert_eq!(reader(&[0x40]).read_bit_double().unwrap(), 1.0);
        assert_eq!(reader(&[0x80]).read_bit_double().unwrap(), 0.0);
    }

    #[test]
    fn test_read_extremes_golden() {
        assert_eq!(reader(&[0x3F, 0xDF, 0xC0]).read_bit_short().unwrap(), i16::MAX);
        assert_eq!(reader(&[0x00, 0x20, 0x00]).read_bit_short().unwrap(), i16::MIN);
        assert_eq!(
            reader(&[0x3F, 0xFF, 0xFF, 0xDF, 0xC0]).read_bit_long().unwrap(),
            i32::MAX
        );
        assert_eq!(
            reader(&[0x00, 0x00, 0x00, 0x20, 0x00]).read_bit_long().unwrap(),
            i32::MIN
        );
        assert_eq!(reader(&[0x00, 0x80]).read_raw_short().unwrap(), i16::MIN);
        assert_eq!(reader(&[0xFF, 0xFF, 0xFF, 0xFF]).read_raw_long().unwrap(), -1);
        assert_eq!(
            reader(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3E, 0x0F, 0xC0])
                .read_bit_double()
                .unwrap(),
            1.5
        );
        assert_eq!(
            reader(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xB0, 0x00])
                .read_bit_double()
                .unwrap(),
            -2.75
        );
        assert_eq!(reader(&[0xC0, 0x40]).read_signed_modular_char().unwrap(), -64);
        assert_eq!(reader(&[0x00, 0x80, 0x01, 0x00]).read_modular_short().unwrap(), 32768);
    }

    #[test]
    fn test_read_bit_long_invalid_code() {
        let err = reader(&[0xC0]).read_bit_long().unwrap_err();
        assert!(matches!(err, DwgError::CorruptStream { position_in_bits: 0, .. }));
    }

    #[test]
    fn test_read_bit_double_invalid_code() {
        assert!(matches!(
            reader(&[0xC0]).read_bit_double(),
            Err(DwgError::CorruptStream { .. })
        ));
    }

    #[test]
    fn test_read_past_end() {
        let mut r = reader(&[0xFF]);
        r.read_byte().unwrap();
        assert!(matches!(r.read_bit(), Err(DwgError::CorruptStream { position_in_bits: 8, .. })));
        assert!(matches!(reader(&[0x00]).read_raw_long(), Err(DwgError::CorruptStream { .. })));
    }

    #[test]
    fn test_read_modular_values() {
        assert_eq!(reader(&[0xAC, 0x02]).read_modular_char().unwrap(), 300);
        assert_eq!(reader(&[0x2C, 0x01]).read_modular_short().unwrap(), 300);
        assert_eq!(reader(&[0x45]).read_signed_modular_char().unwrap(), -5);
        assert_eq!(reader(&[0xAC, 0x42]).read_signed_modular_char().unwrap(), -300);
    }

    #[test]
    fn test_read_handle_reference() {
        let h = reader(&[0x21, 0x1A]).read_handle_reference().unwrap();
        assert_eq!(h, HandleReference::new(DwgReferenceType::SoftOwner, 0x1A));

        let h = reader(&[0x52, 0x12, 0x34]).read_handle_reference().unwrap();
        assert_eq!(h, HandleReference::new(DwgReferenceType::HardPointer, 0x1234));

        let h = reader(&[0x60]).read_handle_reference().unwrap();
        assert_eq!(h.code, DwgReferenceType::PlusOne);
    }

    #[test]
    fn test_read_handle_reference_invalid() {
        assert!(matches!(
            reader(&[0x29]).read_handle_reference(),
            Err(DwgError::CorruptStream { .. })
        ));
        assert!(matches!(
            reader(&[0x10]).read_handle_reference(),
            Err(DwgError::CorruptStream { .. })
        ));
    }

    #[test]
    fn test_read_bit_double_with_default_keeps_default() {
        assert_eq!(reader(&[0x00]).read_bit_double_with_default(2.5).unwrap(), 2.5);
    }

    #[test]
    fn test_set_position_in_bits() {
        let data = [0x00, 0b0010_0000];
        let mut r = reader(&data);
        r.set_position_in_bits(10).unwrap();
        assert!(r.read_bit().unwrap());
        assert_eq!(r.position_in_bits(), 11);
    }

    #[test]
    fn test_r13_thickness_is_plain_bit_double() {
        let mut r = DwgStreamReader::new(&[0x80], DwgVersion::AC1014);
        assert_eq!(r.read_bit_thickness().unwrap(), 0.0);
        assert_eq!(r.position_in_bits(), 2);
    }
}
