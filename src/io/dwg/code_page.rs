//! File header code page to text encoding mapping.
//!
//! R13-R2000 files store text in the single-byte or DBCS code page whose
//! index is written in the file header.

use encoding_rs::Encoding;

/// Get the `encoding_rs` encoding for a file header code page index.
///
/// Unknown indices fall back to Windows-1252.
pub fn encoding_from_code_page(code_page: u16) -> &'static Encoding {
    match code_page {
        // ISO encodings
        2 => encoding_rs::WINDOWS_1252,
        3 => encoding_rs::ISO_8859_2,
        4 => encoding_rs::ISO_8859_3,
        5 => encoding_rs::ISO_8859_4,
        6 => encoding_rs::ISO_8859_5,
        7 => encoding_rs::ISO_8859_6,
        8 => encoding_rs::ISO_8859_7,
        9 => encoding_rs::ISO_8859_8,
        10 => encoding_rs::WINDOWS_1254,

        // DOS/OEM code pages
        11 | 14 | 27 => encoding_rs::IBM866, // closest available in encoding_rs
        13 => encoding_rs::WINDOWS_1250,
        15 => encoding_rs::WINDOWS_1254,
        21 => encoding_rs::WINDOWS_1253,

        // Asian encodings
        22 | 38 => encoding_rs::SHIFT_JIS,
        24 | 41 => encoding_rs::BIG5,
        25 | 26 | 40 | 42 => encoding_rs::EUC_KR,
        31 | 39 => encoding_rs::GBK,

        // Windows/ANSI code pages
        28 => encoding_rs::WINDOWS_1250,
        29 => encoding_rs::WINDOWS_1251,
        32 => encoding_rs::WINDOWS_1253,
        33 => encoding_rs::WINDOWS_1254,
        34 => encoding_rs::WINDOWS_1255,
        35 => encoding_rs::WINDOWS_1256,
        36 => encoding_rs::WINDOWS_1257,
        37 => encoding_rs::WINDOWS_874,
        44 => encoding_rs::WINDOWS_1258,

        // ANSI_1252 (30), ASCII and the Western DOS pages
        _ => encoding_rs::WINDOWS_1252,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_code_pages() {
        assert_eq!(encoding_from_code_page(30), encoding_rs::WINDOWS_1252);
        assert_eq!(encoding_from_code_page(29), encoding_rs::WINDOWS_1251);
        assert_eq!(encoding_from_code_page(22), encoding_rs::SHIFT_JIS);
        assert_eq!(encoding_from_code_page(999), encoding_rs::WINDOWS_1252);
    }
}
