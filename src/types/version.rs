//! DWG format versions handled by the codec

use std::fmt;
use std::str::FromStr;

use crate::error::DwgError;

/// File format version tag, as stored in the first six bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DwgVersion {
    /// Release 13
    AC1012,
    /// Release 14
    AC1014,
    /// AutoCAD 2000
    AC1015,
}

impl DwgVersion {
    pub const ALL: [DwgVersion; 3] = [DwgVersion::AC1012, DwgVersion::AC1014, DwgVersion::AC1015];

    pub fn as_str(&self) -> &'static str {
        match self {
            DwgVersion::AC1012 => "AC1012",
            DwgVersion::AC1014 => "AC1014",
            DwgVersion::AC1015 => "AC1015",
        }
    }
}

impl Default for DwgVersion {
    fn default() -> Self {
        DwgVersion::AC1015
    }
}

impl FromStr for DwgVersion {
    type Err = DwgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AC1012" => Ok(DwgVersion::AC1012),
            "AC1014" => Ok(DwgVersion::AC1014),
            "AC1015" => Ok(DwgVersion::AC1015),
            other => Err(DwgError::UnsupportedVersion(other.to_string())),
        }
    }
}

impl fmt::Display for DwgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        for version in DwgVersion::ALL {
            assert_eq!(version.as_str().parse::<DwgVersion>().unwrap(), version);
        }
    }

    #[test]
    fn test_parse_unknown_version() {
        let err = "AC1018".parse::<DwgVersion>().unwrap_err();
        assert!(matches!(err, DwgError::UnsupportedVersion(ref s) if s == "AC1018"));
    }

    #[test]
    fn test_ordering() {
        assert!(DwgVersion::AC1012 < DwgVersion::AC1014);
        assert!(DwgVersion::AC1014 < DwgVersion::AC1015);
    }
}
